//! Configuration file management.
//!
//! Handles reading, writing, and validating `.brewgate.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::core::credential::CipherKind;
use crate::core::domain::{EnvironmentDescriptor, OperatingSystem, Toolchain};
use crate::core::gate::ReleaseCondition;
use crate::error::{ConfigError, Result};

/// Project configuration stored in `.brewgate.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// One entry per environment descriptor
    #[serde(default)]
    pub matrix: Vec<EnvironmentDescriptor>,
    #[serde(default)]
    pub prepare: PrepareConfig,
    #[serde(default)]
    pub steps: StepsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub release: ReleaseCondition,
    #[serde(default)]
    pub context: ContextConfig,
    pub publish: PublishConfig,
}

/// The project under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Package name, substituted for `{package}` in publish commands
    pub name: String,
    /// Working-tree source directory hidden while the suite runs.
    /// Defaults to the package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ProjectConfig {
    pub fn source_dir(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }
}

/// How runtime executables are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Executable for language-managed entries; `{version}` is substituted
    #[serde(default = "default_runtime_command")]
    pub command: String,
    /// Executable for generic entries
    #[serde(default = "default_runtime_generic")]
    pub generic: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command: default_runtime_command(),
            generic: default_runtime_generic(),
        }
    }
}

/// OS-specific preparation routines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrepareConfig {
    #[serde(default)]
    pub linux: Vec<String>,
    #[serde(default)]
    pub osx: Vec<String>,
}

/// Shell steps run for every descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepsConfig {
    #[serde(default)]
    pub install: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub test: Vec<String>,
}

/// Directories persisted between runs, and noise pruned before persisting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub directories: Vec<String>,
    /// Glob patterns relative to the workspace
    #[serde(default)]
    pub prune: Vec<String>,
}

/// Names of the environment variables describing the build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_branch_var")]
    pub branch: String,
    #[serde(default = "default_tag_var")]
    pub tag: String,
    #[serde(default = "default_os_var")]
    pub os: String,
    #[serde(default = "default_version_var")]
    pub version: String,
    #[serde(default = "default_build_var")]
    pub build: String,
    #[serde(default = "default_test_result_var")]
    pub test_result: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            branch: default_branch_var(),
            tag: default_tag_var(),
            os: default_os_var(),
            version: default_version_var(),
            build: default_build_var(),
            test_result: default_test_result_var(),
        }
    }
}

/// Formula publishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Installs the formula generator
    #[serde(default)]
    pub install_generator: Option<String>,
    /// Prints the formula on stdout; `{package}` is substituted
    pub generator: String,
    /// Lints the formula; `{formula}` is substituted
    #[serde(default)]
    pub validator: Option<String>,
    /// Formula repository clone URL
    pub repository: String,
    /// Formula path inside the repository
    pub formula: String,
    /// Main line of the formula repository
    #[serde(default = "default_publish_branch")]
    pub branch: String,
    /// Commit message; must contain `{build}` and `{tag}`
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default = "default_author_name")]
    pub author_name: String,
    #[serde(default = "default_author_email")]
    pub author_email: String,
    pub credential: CredentialConfig,
}

/// Encrypted deploy credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Encrypted file, relative to the project root
    pub path: PathBuf,
    #[serde(default)]
    pub cipher: CipherKind,
    /// Variable holding the hex key (aes-256-cbc)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_env: Option<String>,
    /// Variable holding the hex IV (aes-256-cbc)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iv_env: Option<String>,
    /// Variable holding the passphrase (age)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase_env: Option<String>,
}

fn default_runtime_command() -> String {
    "python{version}".to_string()
}

fn default_runtime_generic() -> String {
    "python3".to_string()
}

fn default_branch_var() -> String {
    constants::travis::BRANCH.to_string()
}

fn default_tag_var() -> String {
    constants::travis::TAG.to_string()
}

fn default_os_var() -> String {
    constants::travis::OS.to_string()
}

fn default_version_var() -> String {
    constants::travis::VERSION.to_string()
}

fn default_build_var() -> String {
    constants::travis::BUILD.to_string()
}

fn default_test_result_var() -> String {
    constants::travis::TEST_RESULT.to_string()
}

fn default_publish_branch() -> String {
    "master".to_string()
}

fn default_message() -> String {
    "Build {build} for release {tag}".to_string()
}

fn default_author_name() -> String {
    "brewgate".to_string()
}

fn default_author_email() -> String {
    "brewgate@users.noreply.github.com".to_string()
}

impl Config {
    /// Default path of the configuration file
    pub fn default_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE)
    }

    /// Load and validate a configuration file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotInitialized` if the file doesn't exist,
    /// or `ConfigError::Parse` if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotInitialized(path.to_path_buf()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config = Self::parse(&contents)?;

        debug!(
            descriptors = config.matrix.len(),
            project = %config.project.name,
            "config loaded"
        );

        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving config");

        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate the configuration structure and contents
    ///
    /// Checks:
    /// - At least one descriptor, no duplicate identities
    /// - Language entries carry a version
    /// - The release environment is one of the descriptors
    /// - The commit message embeds the build and the tag
    /// - The credential cipher has the secret variables it needs
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` or `ConfigError::MissingField` on validation failure.
    pub fn validate(&self) -> Result<()> {
        debug!("validating config");

        if self.project.name.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "project.name" }.into());
        }

        let source = self.project.source_dir();
        if source.contains('/') || source.contains('\\') || source == "." || source == ".." {
            return Err(ConfigError::InvalidValue {
                field: "project.source",
                reason: format!("must be a single directory name, got '{}'", source),
            }
            .into());
        }

        if self.matrix.is_empty() {
            return Err(ConfigError::MissingField { field: "matrix" }.into());
        }

        let mut seen = HashSet::new();
        for descriptor in &self.matrix {
            if descriptor.toolchain == Toolchain::Language && descriptor.version.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "matrix",
                    reason: format!("{} entry needs a version", descriptor.os),
                }
                .into());
            }
            if !seen.insert(descriptor.id()) {
                return Err(ConfigError::InvalidValue {
                    field: "matrix",
                    reason: format!("duplicate entry {}", descriptor.id()),
                }
                .into());
            }
        }

        if self.release.branch.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "release.branch" }.into());
        }
        if self.descriptor(&self.release.os, &self.release.version).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "release",
                reason: format!(
                    "{} {} is not in the matrix",
                    OperatingSystem::parse(&self.release.os),
                    self.release.version
                ),
            }
            .into());
        }

        let publish = &self.publish;
        if publish.generator.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "publish.generator" }.into());
        }
        if publish.repository.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "publish.repository" }.into());
        }
        if publish.formula.trim().is_empty() || Path::new(&publish.formula).is_absolute() {
            return Err(ConfigError::InvalidValue {
                field: "publish.formula",
                reason: "must be a path relative to the repository root".to_string(),
            }
            .into());
        }
        for placeholder in ["{build}", "{tag}"] {
            if !publish.message.contains(placeholder) {
                return Err(ConfigError::InvalidValue {
                    field: "publish.message",
                    reason: format!("must contain {}", placeholder),
                }
                .into());
            }
        }

        let credential = &publish.credential;
        match credential.cipher {
            CipherKind::Aes256Cbc => {
                if credential.key_env.is_none() {
                    return Err(ConfigError::MissingField {
                        field: "publish.credential.key_env",
                    }
                    .into());
                }
                if credential.iv_env.is_none() {
                    return Err(ConfigError::MissingField {
                        field: "publish.credential.iv_env",
                    }
                    .into());
                }
            }
            CipherKind::Age => {
                if credential.passphrase_env.is_none() {
                    return Err(ConfigError::MissingField {
                        field: "publish.credential.passphrase_env",
                    }
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Find the descriptor a worker reports as its environment
    pub fn descriptor(&self, os: &str, version: &str) -> Option<&EnvironmentDescriptor> {
        self.matrix.iter().find(|d| d.matches(os, version))
    }

    /// Like [`Config::descriptor`], failing when there is no match
    pub fn require_descriptor(&self, os: &str, version: &str) -> Result<&EnvironmentDescriptor> {
        self.descriptor(os, version).ok_or_else(|| {
            ConfigError::UnknownDescriptor {
                os: os.to_string(),
                version: version.to_string(),
            }
            .into()
        })
    }
}

/// Starter configuration written by `brewgate init`.
pub fn template(package: &str) -> String {
    format!(
        r#"# brewgate configuration

[project]
name = "{package}"
# source = "{package}"   # directory hidden while the suite runs

[runtime]
command = "python{{version}}"
generic = "python3"

[[matrix]]
os = "linux"
version = "3.5"

[[matrix]]
os = "linux"
version = "3.6"

[[matrix]]
os = "osx"
toolchain = "generic"

[prepare]
linux = ["sudo apt-get update -qq"]
osx = ["brew update"]

[steps]
install = ["$BREWGATE_RUNTIME -m pip install ."]
dependencies = ["$BREWGATE_RUNTIME -m pip install -r requirements.txt -r test_requirements.txt"]
test = ["$BREWGATE_RUNTIME -m pytest tests"]

[cache]
directories = ["tests/cache"]
prune = ["tests/cache/*.log"]

[release]
branch = "master"
os = "linux"
version = "3.6"

[publish]
install_generator = "$BREWGATE_RUNTIME -m pip install homebrew-pypi-poet"
generator = "poet -f {{package}}"
validator = "brew audit --strict {{formula}}"
repository = "git@github.com:example/homebrew-{package}.git"
formula = "{package}.rb"

[publish.credential]
path = "deploy/key.enc"
cipher = "aes-256-cbc"
key_env = "DEPLOY_KEY"
iv_env = "DEPLOY_IV"
"#
    )
}
