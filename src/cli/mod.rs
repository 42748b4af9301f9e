//! Command-line interface.

pub mod cache;
pub mod ci;
pub mod completions;
pub mod formula;
pub mod gate;
pub mod init;
pub mod matrix;
pub mod output;
pub mod project;
pub mod publish;
pub mod run;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::Config;
use crate::core::domain::BuildContext;

/// Brewgate - matrix tests and gated Homebrew formula releases.
#[derive(Parser)]
#[command(
    name = "brewgate",
    about = "Run a test matrix and publish a Homebrew formula for tagged releases",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (defaults to ./.brewgate.toml)
    #[arg(short, long, global = true, env = "BREWGATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Build context overrides.
///
/// Anything not given on the command line is read from the environment
/// variables named in the `[context]` section.
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Branch being built
    #[arg(long)]
    pub branch: Option<String>,

    /// Release tag of the build
    #[arg(long)]
    pub tag: Option<String>,

    /// Operating system of the build environment
    #[arg(long)]
    pub os: Option<String>,

    /// Runtime version of the build environment
    #[arg(long = "runtime-version")]
    pub runtime_version: Option<String>,

    /// Build identifier used in the commit message
    #[arg(long)]
    pub build: Option<String>,

    /// Treat the suite as passed without reading the test-result variable
    #[arg(long)]
    pub suite_passed: bool,
}

impl ContextArgs {
    /// Merge the overrides over the environment.
    pub fn resolve(&self, config: &Config) -> BuildContext {
        self.resolve_with(config, |name| std::env::var(name).ok())
    }

    fn resolve_with(&self, config: &Config, lookup: impl Fn(&str) -> Option<String>) -> BuildContext {
        let mut ctx = BuildContext::from_lookup(&config.context, lookup);
        let overrides = [
            (&mut ctx.branch, &self.branch),
            (&mut ctx.tag, &self.tag),
            (&mut ctx.os, &self.os),
            (&mut ctx.version, &self.runtime_version),
            (&mut ctx.build, &self.build),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = Some(value.clone());
            }
        }
        if self.suite_passed {
            ctx.suite_passed = true;
        }
        ctx
    }
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Write a starter .brewgate.toml in the current directory
    Init {
        /// Package name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Run every environment in the matrix, each in its own workspace
    Matrix {
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the suite for one environment in the current directory
    Run {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Decide whether this build publishes a formula
    Gate {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Generate the formula without publishing it
    Formula {
        /// Write the formula to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also run the configured validator
        #[arg(long)]
        validate: bool,
    },

    /// Publish the formula if the gate passes
    Publish {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Run this environment's suite, then publish if the gate passes
    Ci {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Inspect and maintain the cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Cache subcommands.
#[derive(Subcommand)]
pub enum CacheAction {
    /// Print the cache key of each environment
    Key {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Delete files matching the prune patterns
    Prune,
}

/// Execute a command.
pub fn execute(command: Command, config: Option<PathBuf>) -> crate::error::Result<()> {
    use Command::*;

    let config = config.as_deref();
    match command {
        Init { name, force } => init::execute(name, force, config),
        Matrix { json } => matrix::execute(json, config),
        Run { context } => run::execute(&context, config),
        Gate { context } => gate::execute(&context, config),
        Formula { output, validate } => formula::execute(output.as_deref(), validate, config),
        Publish { context } => publish::execute(&context, config),
        Ci { context } => ci::execute(&context, config),
        Cache { action } => match action {
            CacheAction::Key { context } => cache::key(&context, config),
            CacheAction::Prune => cache::prune(config),
        },
        Completions { shell } => completions::execute(shell),
    }
}
