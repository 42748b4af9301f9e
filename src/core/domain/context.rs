//! Build context.
//!
//! What the hosting scheduler tells us about the current build. Built once
//! at the edge from environment variables and passed down explicitly.

use crate::core::config::ContextConfig;

/// Facts about the running build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildContext {
    pub branch: Option<String>,
    pub tag: Option<String>,
    pub os: Option<String>,
    pub version: Option<String>,
    pub build: Option<String>,
    pub suite_passed: bool,
}

impl BuildContext {
    /// Read the context using the configured variable names.
    ///
    /// `lookup` resolves a variable name to its value; the CLI passes the
    /// process environment. Empty values count as unset. The suite counts
    /// as passed only when the test-result variable is `0`.
    pub fn from_lookup(vars: &ContextConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let suite_passed = get(&vars.test_result)
            .map(|v| v.trim() == "0")
            .unwrap_or(false);

        Self {
            branch: get(&vars.branch),
            tag: get(&vars.tag),
            os: get(&vars.os),
            version: get(&vars.version),
            build: get(&vars.build),
            suite_passed,
        }
    }

    /// Whether the build was triggered by a tag.
    pub fn is_tag(&self) -> bool {
        self.tag.is_some()
    }
}
