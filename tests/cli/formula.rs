//! Tests for `brewgate formula`.

use crate::support::*;
use std::fs;

fn project(generator: &str, validator: &str) -> Test {
    let t = Test::with_config(&config(&ConfigOptions {
        generator,
        validator,
        ..ConfigOptions::default()
    }));
    t.write("formula.txt", FORMULA);
    t
}

#[test]
fn test_prints_normalized_formula() {
    // CRLF line endings, trailing spaces and extra blank lines
    let t = project("printf '\\n\\n'; sed 's/$/  \\r/' formula.txt; printf '\\n\\n'", "true");

    let output = t.run_args(&["formula"]);
    assert_success(&output);
    assert_eq!(stdout(&output), FORMULA);
}

#[test]
fn test_writes_file_with_summary() {
    let t = project("cat formula.txt", "true");

    let output = t.run_args(&["formula", "--output", "out/pkg.rb", "--validate"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Pkg");
    assert_stdout_contains(&output, "six");
    assert_stdout_contains(&output, "validator passed");
    assert_eq!(fs::read_to_string(t.path("out/pkg.rb")).unwrap(), FORMULA);
}

#[test]
fn test_regeneration_is_byte_identical() {
    let t = project("cat formula.txt", "true");

    assert_success(&t.run_args(&["formula", "-o", "first.rb"]));
    assert_success(&t.run_args(&["formula", "-o", "second.rb"]));
    assert_eq!(
        fs::read(t.path("first.rb")).unwrap(),
        fs::read(t.path("second.rb")).unwrap()
    );
}

#[test]
fn test_malformed_formula_rejected() {
    let t = project("echo 'class Pkg < Formula'; echo end", "true");

    let output = t.run_args(&["formula"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "malformed formula: no top-level url");
}

#[test]
fn test_validator_failure() {
    let t = project("cat formula.txt", "exit 7");

    let output = t.run_args(&["formula", "--validate"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "validate step failed (exit 7)");
}

#[test]
fn test_generator_failure() {
    let t = project("exit 2", "true");

    let output = t.run_args(&["formula"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "generate step failed (exit 2)");
}
