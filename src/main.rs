//! Brewgate - matrix tests and gated Homebrew formula releases.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use brewgate::cli::output;
use brewgate::cli::{execute, Cli};
use brewgate::error::{ConfigError, CredentialError, Error, RemoteError, StepError};

fn hint(error: &Error) -> Option<String> {
    match error {
        Error::Config(ConfigError::NotInitialized(_)) => Some("run: brewgate init".to_string()),
        Error::Config(ConfigError::UnknownDescriptor { .. }) => {
            Some("add the environment to [[matrix]] in .brewgate.toml".to_string())
        }
        Error::Credential(CredentialError::MissingSecret(var)) => {
            Some(format!("export {} in the build environment", var))
        }
        Error::Step(StepError::RuntimeNotFound(_)) => {
            Some("check [runtime] command in .brewgate.toml".to_string())
        }
        Error::Remote(RemoteError::GitMissing) => Some("install git".to_string()),
        _ => None,
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("BREWGATE_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("brewgate=debug")
        } else {
            EnvFilter::new("brewgate=warn")
        }
    });

    // Logs go to stderr so stdout stays clean for formulas and JSON reports.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command, cli.config) {
        output::error(&e.to_string());
        if let Some(hint) = hint(&e) {
            output::hint(&hint);
        }
        std::process::exit(1);
    }
}
