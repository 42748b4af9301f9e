//! Tests for `brewgate init`.

use crate::support::*;
use std::fs;

#[test]
fn test_init_writes_loadable_config() {
    let t = Test::new();

    let output = t.init_cmd("ocrmypdf");
    assert_success(&output);
    assert_stdout_contains(&output, "initialized");

    let contents = fs::read_to_string(t.path(".brewgate.toml")).unwrap();
    assert!(contents.contains("name = \"ocrmypdf\""));

    // The template is valid enough for gate to load it
    let output = t.run_args(&["gate"]);
    assert_success(&output);
}

#[test]
fn test_init_twice_fails() {
    let t = Test::new();
    assert_success(&t.init_cmd("ocrmypdf"));

    let output = t.init_cmd("ocrmypdf");
    assert_failure(&output);
    assert_stderr_contains(&output, "already initialized");
}

#[test]
fn test_init_force_overwrites() {
    let t = Test::new();
    assert_success(&t.init_cmd("first"));

    let output = t.run_args(&["init", "--name", "second", "--force"]);
    assert_success(&output);
    let contents = fs::read_to_string(t.path(".brewgate.toml")).unwrap();
    assert!(contents.contains("name = \"second\""));
}
