//! Formula repository.
//!
//! A git checkout of the separate formula repository. Every git invocation
//! authenticates with the decrypted deploy key through `GIT_SSH_COMMAND`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::core::credential::CredentialFile;
use crate::core::formula::Formula;
use crate::error::{Error, RemoteError, Result, Stage};

/// Commit author.
#[derive(Debug, Clone)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// Local clone of the formula repository.
#[derive(Debug)]
pub struct FormulaRepository {
    dir: PathBuf,
    ssh_command: String,
}

fn ssh_command(key: &Path) -> Result<String> {
    let key = key.to_string_lossy();
    let quoted = shlex::try_quote(&key)
        .map_err(|e| Error::Other(format!("cannot quote key path: {}", e)))?;
    Ok(format!(
        "ssh -i {} -o IdentitiesOnly=yes -o StrictHostKeyChecking=accept-new",
        quoted
    ))
}

fn git(dir: &Path, ssh_command: &str, stage: Stage, args: &[&str]) -> Result<String> {
    debug!(stage = %stage, ?args, "git");
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_SSH_COMMAND", ssh_command)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::Remote(RemoteError::GitMissing),
            _ => Error::Io(e),
        })?;

    if !output.status.success() {
        return Err(RemoteError::Git {
            stage,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

impl FormulaRepository {
    /// Clone `branch` of `url` into `dest`.
    ///
    /// # Errors
    ///
    /// Fails if the credential is no longer owner-read-only or git fails.
    pub fn clone(url: &str, branch: &str, dest: &Path, credential: &CredentialFile) -> Result<Self> {
        credential.verify()?;
        let ssh_command = ssh_command(credential.path())?;

        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        let dest_str = dest.to_string_lossy();
        git(
            parent,
            &ssh_command,
            Stage::Clone,
            &["clone", "--quiet", "--single-branch", "--branch", branch, url, &dest_str],
        )?;
        info!(url, branch, "formula repository cloned");

        Ok(Self {
            dir: dest.to_path_buf(),
            ssh_command,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Overwrite the formula file in the checkout.
    pub fn write_formula(&self, relative: &str, formula: &Formula) -> Result<()> {
        formula.write(&self.dir.join(relative))
    }

    /// Whether the formula file differs from the checked-out commit.
    pub fn formula_changed(&self, relative: &str) -> Result<bool> {
        let status = git(
            &self.dir,
            &self.ssh_command,
            Stage::Commit,
            &["status", "--porcelain", "--", relative],
        )?;
        Ok(!status.trim().is_empty())
    }

    /// Commit only the formula file.
    pub fn commit(&self, relative: &str, message: &str, author: &Author) -> Result<()> {
        git(&self.dir, &self.ssh_command, Stage::Commit, &["add", "--", relative])?;

        let name = format!("user.name={}", author.name);
        let email = format!("user.email={}", author.email);
        git(
            &self.dir,
            &self.ssh_command,
            Stage::Commit,
            &["-c", &name, "-c", &email, "commit", "--quiet", "-m", message, "--", relative],
        )?;
        debug!(message, "formula committed");
        Ok(())
    }

    /// Push the current commit to `branch` on origin.
    pub fn push(&self, branch: &str, credential: &CredentialFile) -> Result<()> {
        credential.verify()?;
        let refspec = format!("HEAD:{}", branch);
        git(
            &self.dir,
            &self.ssh_command,
            Stage::Push,
            &["push", "--quiet", "origin", &refspec],
        )?;
        info!(branch, "formula pushed");
        Ok(())
    }
}
