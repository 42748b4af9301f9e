//! Tests for `brewgate cache`.

use crate::support::*;

#[test]
fn test_keys_are_stable_and_distinct() {
    let t = Test::project("true");

    let first = stdout(&t.run_args(&["cache", "key"]));
    let second = stdout(&t.run_args(&["cache", "key"]));
    assert_eq!(first, second);
    assert!(first.contains("linux-3.5:"));
    assert!(first.contains("osx-generic:"));

    let one = stdout(&t.run_args(&["cache", "key", "--os", "linux", "--runtime-version", "3.5"]));
    let other = stdout(&t.run_args(&["cache", "key", "--os", "linux", "--runtime-version", "3.6"]));
    assert_eq!(one.trim().len(), 16);
    assert_ne!(one, other);
}

#[test]
fn test_prune_removes_matching_files_only() {
    let t = Test::with_config(&config(&ConfigOptions {
        prune: &["tests/cache/*.log"],
        ..ConfigOptions::default()
    }));
    t.write("tests/cache/run.log", "log");
    t.write("tests/cache/keep.pdf", "pdf");

    let output = t.run_args(&["cache", "prune"]);
    assert_success(&output);
    assert_stdout_contains(&output, "pruned 1 files");
    assert!(!t.path("tests/cache/run.log").exists());
    assert!(t.path("tests/cache/keep.pdf").exists());
}

#[test]
fn test_matrix_persists_cache_between_runs() {
    // First run stores a file in the cache dir, second run expects it back.
    let t = Test::with_config(&config(&ConfigOptions {
        test: "if test -f .cache/seen; then touch .cache/second; else mkdir -p .cache && touch .cache/seen; fi",
        cache: &[".cache"],
        ..ConfigOptions::default()
    }));

    assert_success(&t.run_args(&["matrix"]));
    assert_success(&t.run_args(&["matrix"]));

    let store = t.path(".brewgate/cache");
    let seconds: Vec<_> = walkdir::WalkDir::new(&store)
        .into_iter()
        .flatten()
        .filter(|e| e.file_name() == "second")
        .collect();
    assert_eq!(seconds.len(), 3);
}

#[test]
fn test_home_cache_dirs_stay_out_of_real_home() {
    let t = Test::with_config(&config(&ConfigOptions {
        test: "mkdir -p ~/.cache/pip && touch ~/.cache/pip/\"$BREWGATE_DESCRIPTOR\"",
        cache: &["~/.cache/pip"],
        ..ConfigOptions::default()
    }));

    assert_success(&t.run_args(&["matrix"]));

    assert!(!t.home.path().join(".cache/pip").exists());
    let stored: Vec<_> = walkdir::WalkDir::new(t.path(".brewgate/cache"))
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file())
        .collect();
    assert_eq!(stored.len(), 3);
}
