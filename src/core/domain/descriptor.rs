//! Environment descriptors.
//!
//! One descriptor per matrix entry: an operating system, a runtime version
//! and whether the runtime is language-managed or generic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system of a matrix entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperatingSystem {
    Linux,
    Osx,
    Other(String),
}

impl OperatingSystem {
    /// Parse an OS name. Unknown names are kept as `Other`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "linux" => Self::Linux,
            "osx" | "macos" | "darwin" => Self::Osx,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::Osx => "osx",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for OperatingSystem {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<OperatingSystem> for String {
    fn from(os: OperatingSystem) -> Self {
        os.as_str().to_string()
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the language runtime is provided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
    /// Runtime selected by version (e.g. `python3.6`).
    #[default]
    Language,
    /// Whatever runtime the image ships (e.g. `python3` on OSX).
    Generic,
}

impl Toolchain {
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::Generic => "generic",
        }
    }
}

/// One matrix entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentDescriptor {
    pub os: OperatingSystem,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default)]
    pub toolchain: Toolchain,
}

impl EnvironmentDescriptor {
    pub fn new(os: OperatingSystem, version: impl Into<String>, toolchain: Toolchain) -> Self {
        Self {
            os,
            version: version.into(),
            toolchain,
        }
    }

    /// Stable identity, e.g. `linux-3.6` or `osx-generic`.
    pub fn id(&self) -> String {
        if self.toolchain.is_generic() {
            format!("{}-generic", self.os)
        } else {
            format!("{}-{}", self.os, self.version)
        }
    }

    /// Whether this descriptor is the one a CI worker reports.
    ///
    /// Generic entries also match an empty version, since generic workers
    /// usually leave the runtime version unset.
    pub fn matches(&self, os: &str, version: &str) -> bool {
        if self.os != OperatingSystem::parse(os) {
            return false;
        }
        self.version == version.trim() || (self.toolchain.is_generic() && version.trim().is_empty())
    }

    /// Runtime executable for this descriptor.
    ///
    /// `template` may contain `{version}`.
    pub fn runtime_command(&self, template: &str, generic: &str) -> String {
        match self.toolchain {
            Toolchain::Language => template.replace("{version}", &self.version),
            Toolchain::Generic => generic.to_string(),
        }
    }
}

impl fmt::Display for EnvironmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}
