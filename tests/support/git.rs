//! Local bare formula repository.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn git(args: &[&str], dir: &Path) -> String {
    let output = Command::new("git")
        .args(["-c", "user.name=fixture", "-c", "user.email=fixture@example.com"])
        .args(["-c", "commit.gpgsign=false", "-c", "init.defaultBranch=master"])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Bare repository with one commit on master.
pub struct Remote {
    _dir: TempDir,
    pub path: PathBuf,
}

impl Remote {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let seed = dir.path().join("seed");
        fs::create_dir(&seed).unwrap();
        git(&["init", "--quiet"], &seed);
        git(&["symbolic-ref", "HEAD", "refs/heads/master"], &seed);
        fs::write(seed.join("README.md"), "# homebrew-pkg\n").unwrap();
        git(&["add", "README.md"], &seed);
        git(&["commit", "--quiet", "-m", "initial"], &seed);
        git(&["clone", "--quiet", "--bare", "seed", "remote.git"], dir.path());

        let path = dir.path().join("remote.git");
        Self { _dir: dir, path }
    }

    fn query(&self, args: &[&str]) -> String {
        git(args, &self.path).trim().to_string()
    }

    pub fn commit_count(&self) -> usize {
        self.query(&["rev-list", "--count", "master"])
            .parse()
            .expect("rev-list count")
    }

    pub fn last_message(&self) -> String {
        self.query(&["log", "-1", "--format=%B", "master"])
    }

    /// Files touched by the newest commit.
    pub fn last_changed_files(&self) -> Vec<String> {
        self.query(&["diff-tree", "--no-commit-id", "--name-only", "-r", "master"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn file(&self, relative: &str) -> String {
        git(&["show", &format!("master:{}", relative)], &self.path)
    }
}
