//! Tests for `brewgate run` and `brewgate ci`.

use crate::support::*;

#[test]
fn test_run_selected_environment() {
    let t = Test::project("test \"$BREWGATE_RUNTIME_VERSION\" = 3.5");

    let output = t.run_args(&["run", "--os", "linux", "--runtime-version", "3.5"]);
    assert_success(&output);
    assert_stdout_contains(&output, "linux-3.5 passed");
}

#[test]
fn test_run_restores_source_after_failure() {
    let t = Test::project("exit 3");

    let output = t.run_args(&["run", "--os", "linux", "--runtime-version", "3.6"]);
    assert_failure(&output);
    assert_stdout_contains(&output, "test step failed (exit 3)");
    assert!(t.path("pkg").is_dir());
    assert!(!t.path("pkg_").exists());
}

#[test]
fn test_run_unknown_environment() {
    let t = Test::project("true");

    let output = t.run_args(&["run", "--os", "linux", "--runtime-version", "2.7"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no matrix entry for os 'linux' version '2.7'");
}

#[test]
fn test_run_needs_os() {
    let t = Test::project("true");

    let output = t.run_args(&["run"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "set TRAVIS_OS_NAME or pass --os");
}

#[test]
fn test_ci_failed_suite_never_publishes() {
    let t = Test::project("false");

    let output = t.as_build("ci", "master", Some("v1.2.0"), "3.6");
    assert_failure(&output);
    assert_stderr_contains(&output, "linux-3.6 failed");
}

#[test]
fn test_ci_non_release_environment_skips_publish() {
    let t = Test::project("true");

    let output = t.as_build("ci", "master", Some("v1.2.0"), "3.5");
    assert_success(&output);
    assert_stdout_contains(&output, "linux-3.5 passed");
    assert_stdout_contains(&output, "publish skipped");
}
