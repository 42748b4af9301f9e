//! Tests for `brewgate gate`.

use crate::support::*;

#[test]
fn test_release_environment_publishes() {
    let t = Test::project("true");

    let output = t.as_build("gate", "master", Some("v1.2.0"), "3.6");
    assert_success(&output);
    assert_stdout_contains(&output, "publish:");
}

#[test]
fn test_other_version_skips_with_success() {
    let t = Test::project("true");

    let output = t.as_build("gate", "master", Some("v1.2.0"), "3.4");
    assert_success(&output);
    assert_stdout_contains(&output, "skip: environment linux 3.4 is not the release environment");
}

#[test]
fn test_untagged_build_skips() {
    let t = Test::project("true");

    let output = t.as_build("gate", "master", None, "3.6");
    assert_success(&output);
    assert_stdout_contains(&output, "skip: build is not a tag");
}

#[test]
fn test_feature_branch_skips() {
    let t = Test::project("true");

    let output = t.as_build("gate", "feature", Some("v1.2.0"), "3.6");
    assert_success(&output);
    assert_stdout_contains(&output, "branch is feature");
}

#[test]
fn test_reads_context_from_environment() {
    let t = Test::project("true");

    let output = t
        .cmd()
        .arg("gate")
        .env("TRAVIS_BRANCH", "master")
        .env("TRAVIS_TAG", "v1.2.0")
        .env("TRAVIS_OS_NAME", "linux")
        .env("TRAVIS_PYTHON_VERSION", "3.6")
        .env("TRAVIS_TEST_RESULT", "1")
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "skip: test suite did not pass");
}

#[test]
fn test_unset_suite_result_skips() {
    let t = Test::project("true");

    let output = t
        .cmd()
        .args(["gate", "--branch", "master", "--tag", "v1.2.0"])
        .args(["--os", "linux", "--runtime-version", "3.6"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "skip: test suite did not pass");

    let output = t
        .cmd()
        .args(["gate", "--branch", "master", "--tag", "v1.2.0", "--suite-passed"])
        .args(["--os", "linux", "--runtime-version", "3.6"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "publish:");
}
