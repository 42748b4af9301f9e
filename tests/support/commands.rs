//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

/// Context variables the binary reads by default.
const CONTEXT_VARS: &[&str] = &[
    "TRAVIS_BRANCH",
    "TRAVIS_TAG",
    "TRAVIS_OS_NAME",
    "TRAVIS_PYTHON_VERSION",
    "TRAVIS_BUILD_NUMBER",
    "TRAVIS_TEST_RESULT",
    "BREWGATE_CONFIG",
    "BREWGATE_LOG",
];

impl Test {
    /// A brewgate command run in the project with a scrubbed environment.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("brewgate").expect("failed to find brewgate binary");
        for var in CONTEXT_VARS {
            cmd.env_remove(var);
        }
        cmd.env("HOME", self.home.path());
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run `brewgate <args>`.
    pub fn run_args(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run brewgate")
    }

    /// Shortcut for `brewgate init --name`.
    pub fn init_cmd(&self, name: &str) -> Output {
        self.run_args(&["init", "--name", name])
    }

    /// Run a context-taking command as a build of `tag` on `branch` in
    /// linux `version`, after a passing suite.
    pub fn as_build(&self, command: &str, branch: &str, tag: Option<&str>, version: &str) -> Output {
        let mut cmd = self.cmd();
        cmd.args([
            command,
            "--branch",
            branch,
            "--os",
            "linux",
            "--runtime-version",
            version,
            "--build",
            "812",
        ]);
        if let Some(tag) = tag {
            cmd.args(["--tag", tag]);
        }
        cmd.env("TRAVIS_TEST_RESULT", "0");
        cmd.env(super::PASSPHRASE_ENV, super::PASSPHRASE);
        cmd.output().expect("failed to run brewgate")
    }
}
