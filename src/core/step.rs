//! Shell step execution.
//!
//! Every configured step is a shell string run with `sh -c` in a working
//! directory. A non-zero exit fails the step; nothing is retried.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::{debug, trace};

use crate::core::constants;
use crate::error::{Result, Stage, StepError};

/// Runs shell steps in one directory with a fixed set of extra variables.
#[derive(Debug)]
pub struct StepRunner {
    dir: PathBuf,
    env: Vec<(String, String)>,
    capture: bool,
    transcript: RefCell<Vec<u8>>,
}

impl StepRunner {
    /// Runner that streams step output to the terminal.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            env: Vec::new(),
            capture: false,
            transcript: RefCell::new(Vec::new()),
        }
    }

    /// Export a variable to every step.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Record step output instead of streaming it.
    ///
    /// Used when several runners share one terminal.
    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Recorded output of captured steps so far.
    pub fn transcript(&self) -> String {
        String::from_utf8_lossy(&self.transcript.borrow()).into_owned()
    }

    fn command(&self, command: &str) -> Command {
        let mut cmd = Command::new(constants::SHELL);
        cmd.arg("-c").arg(command).current_dir(&self.dir);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run one step.
    ///
    /// # Errors
    ///
    /// Returns `StepError::Spawn` if the shell cannot start and
    /// `StepError::Failed` on a non-zero exit.
    pub fn run(&self, stage: Stage, command: &str) -> Result<()> {
        debug!(stage = %stage, command = %command, dir = %self.dir.display(), "running step");

        let status = if self.capture {
            let output = self.output(stage, command, Stdio::null())?;
            let mut transcript = self.transcript.borrow_mut();
            transcript.extend_from_slice(format!("$ {}\n", command).as_bytes());
            transcript.extend_from_slice(&output.stdout);
            transcript.extend_from_slice(&output.stderr);
            output.status
        } else {
            self.command(command)
                .status()
                .map_err(|source| StepError::Spawn {
                    stage,
                    command: command.to_string(),
                    source,
                })?
        };

        if !status.success() {
            return Err(StepError::Failed {
                stage,
                command: command.to_string(),
                code: status.code(),
            }
            .into());
        }

        trace!(stage = %stage, "step finished");
        Ok(())
    }

    /// Run steps in order, stopping at the first failure.
    pub fn run_all(&self, stage: Stage, commands: &[String]) -> Result<()> {
        for command in commands {
            self.run(stage, command)?;
        }
        Ok(())
    }

    /// Run one step and return its stdout.
    ///
    /// Stderr is passed through so tool diagnostics stay visible.
    pub fn stdout(&self, stage: Stage, command: &str) -> Result<Vec<u8>> {
        debug!(stage = %stage, command = %command, "capturing step output");

        let output = self.output(stage, command, Stdio::inherit())?;
        if !output.status.success() {
            return Err(StepError::Failed {
                stage,
                command: command.to_string(),
                code: output.status.code(),
            }
            .into());
        }
        Ok(output.stdout)
    }

    fn output(&self, stage: Stage, command: &str, stderr: Stdio) -> Result<Output> {
        let mut cmd = self.command(command);
        cmd.stdin(Stdio::null()).stdout(Stdio::piped());
        if self.capture {
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stderr(stderr);
        }
        cmd.output().map_err(|source| {
            StepError::Spawn {
                stage,
                command: command.to_string(),
                source,
            }
            .into()
        })
    }
}
