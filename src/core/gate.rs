//! Release gate.
//!
//! Decides whether the current build publishes a formula. Any mismatch is a
//! skip, never an error.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::domain::{BuildContext, OperatingSystem};

/// Conditions a build must meet to publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCondition {
    /// Release branch
    pub branch: String,
    /// Designated OS
    pub os: String,
    /// Designated runtime version
    pub version: String,
}

/// Outcome of gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Publish,
    Skip(SkipReason),
}

impl GateDecision {
    pub fn should_publish(&self) -> bool {
        matches!(self, Self::Publish)
    }
}

/// Why a build does not publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    SuiteFailed,
    Branch { expected: String, actual: Option<String> },
    NotTagged,
    Environment { os: Option<String>, version: Option<String> },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuiteFailed => write!(f, "test suite did not pass"),
            Self::Branch { expected, actual } => write!(
                f,
                "branch is {}, releases come from {}",
                actual.as_deref().unwrap_or("unset"),
                expected
            ),
            Self::NotTagged => write!(f, "build is not a tag"),
            Self::Environment { os, version } => write!(
                f,
                "environment {} {} is not the release environment",
                os.as_deref().unwrap_or("unset"),
                version.as_deref().unwrap_or("unset")
            ),
        }
    }
}

impl ReleaseCondition {
    /// Evaluate the gate for a build.
    ///
    /// Publishes iff the suite passed, the branch is the release branch, the
    /// build is a tag and the environment is the designated one.
    pub fn evaluate(&self, ctx: &BuildContext) -> GateDecision {
        if !ctx.suite_passed {
            return GateDecision::Skip(SkipReason::SuiteFailed);
        }

        if ctx.branch.as_deref() != Some(self.branch.as_str()) {
            return GateDecision::Skip(SkipReason::Branch {
                expected: self.branch.clone(),
                actual: ctx.branch.clone(),
            });
        }

        if !ctx.is_tag() {
            return GateDecision::Skip(SkipReason::NotTagged);
        }

        if !self.is_release_environment(ctx.os.as_deref(), ctx.version.as_deref()) {
            return GateDecision::Skip(SkipReason::Environment {
                os: ctx.os.clone(),
                version: ctx.version.clone(),
            });
        }

        GateDecision::Publish
    }

    /// Whether a worker reporting `os` and `version` is the designated one.
    ///
    /// An unset version reads as empty, which is how generic workers report
    /// it and how a generic release entry is configured.
    pub fn is_release_environment(&self, os: Option<&str>, version: Option<&str>) -> bool {
        let Some(os) = os else {
            return false;
        };
        OperatingSystem::parse(os) == OperatingSystem::parse(&self.os)
            && version.unwrap_or("").trim() == self.version.trim()
    }
}
