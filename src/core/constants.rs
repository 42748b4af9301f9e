//! Constants used throughout brewgate.
//!
//! Centralizes magic strings and configuration values.

/// Configuration file name (.brewgate.toml).
pub const CONFIG_FILE: &str = ".brewgate.toml";

/// State directory for matrix workspaces and the cache store.
pub const STATE_DIR: &str = ".brewgate";

/// Cache store directory, relative to the state directory.
pub const CACHE_DIR: &str = "cache";

/// Matrix workspace directory, relative to the state directory.
pub const WORK_DIR: &str = "work";

/// Suffix of a matrix worker's home directory, next to its workspace.
pub const HOME_SUFFIX: &str = ".home";

/// Suffix appended to the source directory while the suite runs.
pub const HIDDEN_SUFFIX: &str = "_";

/// Length of the hex cache key derived from a descriptor identity.
pub const CACHE_KEY_LEN: usize = 16;

/// Shell used for every configured step.
pub const SHELL: &str = "sh";

/// Mode applied to a decrypted credential (owner read-only).
pub const CREDENTIAL_MODE: u32 = 0o400;

/// Entries never copied into a matrix workspace.
pub const WORKSPACE_EXCLUDES: &[&str] = &[".git", STATE_DIR];

/// Environment variables exported to every step.
pub mod env {
    pub const OS: &str = "BREWGATE_OS";
    pub const RUNTIME: &str = "BREWGATE_RUNTIME";
    pub const RUNTIME_VERSION: &str = "BREWGATE_RUNTIME_VERSION";
    pub const TOOLCHAIN: &str = "BREWGATE_TOOLCHAIN";
    pub const DESCRIPTOR: &str = "BREWGATE_DESCRIPTOR";
    pub const CACHE_KEY: &str = "BREWGATE_CACHE_KEY";
}

/// Default build-context variable names (Travis CI).
pub mod travis {
    pub const BRANCH: &str = "TRAVIS_BRANCH";
    pub const TAG: &str = "TRAVIS_TAG";
    pub const OS: &str = "TRAVIS_OS_NAME";
    pub const VERSION: &str = "TRAVIS_PYTHON_VERSION";
    pub const BUILD: &str = "TRAVIS_BUILD_NUMBER";
    pub const TEST_RESULT: &str = "TRAVIS_TEST_RESULT";
}
