//! Tests for `brewgate publish`, end to end against a local repository.

use crate::skip_without_git;
use crate::support::git::Remote;
use crate::support::*;

const VALIDATOR: &str = "grep -q 'class Pkg < Formula' {formula}";

#[test]
fn test_publish_creates_one_commit() {
    skip_without_git!();
    let remote = Remote::new();
    let t = Test::publishing(&remote.path, VALIDATOR);
    let before = remote.commit_count();

    let output = t.as_build("publish", "master", Some("v1.2.0"), "3.6");
    assert_success(&output);
    assert_stdout_contains(&output, "published");

    assert_eq!(remote.commit_count(), before + 1);
    assert_eq!(remote.last_changed_files(), vec![FORMULA_PATH.to_string()]);
    let message = remote.last_message();
    assert!(message.contains("812"), "{}", message);
    assert!(message.contains("v1.2.0"), "{}", message);
    assert_eq!(remote.file(FORMULA_PATH), FORMULA);
}

#[test]
fn test_publish_displays_formula_first() {
    skip_without_git!();
    let remote = Remote::new();
    let t = Test::publishing(&remote.path, VALIDATOR);

    let output = t.as_build("publish", "master", Some("v1.2.0"), "3.6");
    assert_success(&output);
    assert_stdout_contains(&output, "class Pkg < Formula");
    assert_stdout_contains(&output, "virtualenv_install_with_resources");
}

#[test]
fn test_republish_same_formula_is_unchanged() {
    skip_without_git!();
    let remote = Remote::new();
    let t = Test::publishing(&remote.path, VALIDATOR);

    assert_success(&t.as_build("publish", "master", Some("v1.2.0"), "3.6"));
    let count = remote.commit_count();

    let output = t.as_build("publish", "master", Some("v1.2.0"), "3.6");
    assert_success(&output);
    assert_stdout_contains(&output, "formula unchanged");
    assert_eq!(remote.commit_count(), count);
}

#[test]
fn test_validation_failure_leaves_remote_alone() {
    skip_without_git!();
    let remote = Remote::new();
    let t = Test::publishing(&remote.path, "false");
    let before = remote.commit_count();

    let output = t.as_build("publish", "master", Some("v1.2.0"), "3.6");
    assert_failure(&output);
    assert_stderr_contains(&output, "validate step failed");
    assert_eq!(remote.commit_count(), before);
}

#[test]
fn test_wrong_passphrase_leaves_remote_alone() {
    skip_without_git!();
    let remote = Remote::new();
    let t = Test::publishing(&remote.path, VALIDATOR);
    let before = remote.commit_count();

    let output = t
        .cmd()
        .args(["publish", "--branch", "master", "--tag", "v1.2.0", "--suite-passed"])
        .args(["--os", "linux", "--runtime-version", "3.6", "--build", "812"])
        .env(PASSPHRASE_ENV, "wrong passphrase")
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "decryption failed");
    assert_output_excludes(&output, "wrong passphrase");
    assert_eq!(remote.commit_count(), before);
}

#[test]
fn test_missing_secret() {
    let t = Test::publishing(std::path::Path::new("/nonexistent"), VALIDATOR);

    let output = t
        .cmd()
        .args(["publish", "--branch", "master", "--tag", "v1.2.0", "--suite-passed"])
        .args(["--os", "linux", "--runtime-version", "3.6", "--build", "812"])
        .env_remove(PASSPHRASE_ENV)
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, &format!("credential secret {} is not set", PASSPHRASE_ENV));
}

#[test]
fn test_skip_needs_no_secret() {
    let t = Test::publishing(std::path::Path::new("/nonexistent"), VALIDATOR);

    let output = t
        .cmd()
        .args(["publish", "--branch", "master", "--tag", "v1.2.0"])
        .args(["--os", "linux", "--runtime-version", "3.4"])
        .env_remove(PASSPHRASE_ENV)
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "publish skipped");
}

#[test]
fn test_unknown_suite_result_never_publishes() {
    let remote = std::path::Path::new("/nonexistent");
    let t = Test::publishing(remote, VALIDATOR);

    // Release build in every respect except that nothing reported the suite
    let output = t
        .cmd()
        .args(["publish", "--branch", "master", "--tag", "v1.2.0"])
        .args(["--os", "linux", "--runtime-version", "3.6", "--build", "812"])
        .env(PASSPHRASE_ENV, PASSPHRASE)
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "publish skipped: test suite did not pass");
}

#[test]
fn test_credential_removed_after_publish() {
    skip_without_git!();
    let remote = Remote::new();
    let t = Test::publishing(&remote.path, VALIDATOR);

    assert_success(&t.as_build("publish", "master", Some("v1.2.0"), "3.6"));

    // Nothing decrypted is left in the project
    let leftovers: Vec<_> = walkdir::WalkDir::new(t.dir.path())
        .into_iter()
        .flatten()
        .filter(|e| e.file_name() == "deploy_key")
        .collect();
    assert!(leftovers.is_empty());
}
