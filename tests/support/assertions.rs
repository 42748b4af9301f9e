//! Test assertion helpers.

use std::process::Output;

/// Assert that a command exited 0, showing both streams if not.
pub fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed ({}):\nstdout:\n{}\nstderr:\n{}",
            output.status,
            stdout(output),
            stderr(output)
        );
    }
}

/// Assert that a command exited 1.
pub fn assert_failure(output: &Output) {
    assert_eq!(
        output.status.code(),
        Some(1),
        "expected exit 1, got {}:\nstdout:\n{}",
        output.status,
        stdout(output)
    );
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Assert stdout contains a string.
pub fn assert_stdout_contains(output: &Output, expected: &str) {
    let out = stdout(output);
    assert!(
        out.contains(expected),
        "stdout missing '{}', got: {}",
        expected,
        out
    );
}

/// Assert stderr contains a string.
pub fn assert_stderr_contains(output: &Output, expected: &str) {
    let err = stderr(output);
    assert!(
        err.contains(expected),
        "stderr missing '{}', got: {}",
        expected,
        err
    );
}

/// Assert neither stream contains a string.
pub fn assert_output_excludes(output: &Output, excluded: &str) {
    let all = format!("{}{}", stdout(output), stderr(output));
    assert!(
        !all.contains(excluded),
        "output should not contain '{}', got: {}",
        excluded,
        all
    );
}
