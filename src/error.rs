//! Error types.
//!
//! Every failure is fatal for the run it occurs in. Nothing here is retried
//! or recovered locally; the binary reports the error and exits non-zero.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Prepare,
    Install,
    Dependencies,
    Test,
    GeneratorInstall,
    Generate,
    Validate,
    Decrypt,
    Clone,
    Commit,
    Push,
}

impl Stage {
    /// Short name shown in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Install => "install",
            Self::Dependencies => "dependencies",
            Self::Test => "test",
            Self::GeneratorInstall => "generator-install",
            Self::Generate => "generate",
            Self::Validate => "validate",
            Self::Decrypt => "decrypt",
            Self::Clone => "clone",
            Self::Commit => "commit",
            Self::Push => "push",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Configuration and build-context errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("not initialized: no {0} found")]
    NotInitialized(PathBuf),

    #[error("already initialized: {0} exists")]
    AlreadyInitialized(PathBuf),

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("no matrix entry for os '{os}' version '{version}'")]
    UnknownDescriptor { os: String, version: String },

    #[error("build context is missing {what} (set {var} or pass --{flag})")]
    MissingContext {
        what: &'static str,
        var: String,
        flag: &'static str,
    },
}

/// Failures while running a shell step or guarding the workspace.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("{stage} step failed (exit {exit}): {command}", exit = display_code(.code))]
    Failed {
        stage: Stage,
        command: String,
        code: Option<i32>,
    },

    #[error("{stage} step could not start: {command}: {source}")]
    Spawn {
        stage: Stage,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("runtime '{0}' not found on PATH")]
    RuntimeNotFound(String),

    #[error("source directory not found: {0}")]
    SourceMissing(PathBuf),

    #[error("cannot hide source: {0} already exists")]
    SourceConflict(PathBuf),

    #[error("failed to prepare workspace {path}: {reason}")]
    Workspace { path: PathBuf, reason: String },
}

impl StepError {
    /// Stage the failure belongs to, when it is tied to one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Failed { stage, .. } | Self::Spawn { stage, .. } => Some(*stage),
            Self::RuntimeNotFound(_) => Some(Stage::Prepare),
            Self::SourceMissing(_) | Self::SourceConflict(_) => Some(Stage::Test),
            Self::Workspace { .. } => None,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string())
}

/// Formula generation and validation errors.
#[derive(Error, Debug)]
pub enum FormulaError {
    #[error("formula generator produced no output")]
    Empty,

    #[error("formula generator output is not UTF-8")]
    NotUtf8,

    #[error("malformed formula: {0}")]
    Malformed(String),
}

/// Credential decryption errors.
///
/// Messages never include key material.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("credential secret {0} is not set")]
    MissingSecret(String),

    #[error("invalid credential secret: {0}")]
    InvalidSecret(String),

    #[error("encrypted credential not found: {0}")]
    NotFound(PathBuf),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("credential file {path} has mode {actual}, expected {expected}")]
    InvalidPermissions {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("failed to write credential file: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// Formula repository (git) errors.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("git not found on PATH")]
    GitMissing,

    #[error("git {stage} failed: {stderr}")]
    Git { stage: Stage, stderr: String },
}

pub type Result<T> = std::result::Result<T, Error>;
