//! Matrix runner.
//!
//! For every environment descriptor: prepare, install the project, install
//! its dependencies and run the suite against the installed package. A
//! failure marks that descriptor failed and nothing else.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::cache::{self, CacheStore};
use crate::core::config::Config;
use crate::core::constants;
use crate::core::domain::EnvironmentDescriptor;
use crate::core::prepare;
use crate::core::source::HiddenSource;
use crate::core::step::StepRunner;
use crate::core::workspace;
use crate::error::{Error, Result, Stage, StepError};

/// Result of one descriptor's run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed {
        stage: Option<Stage>,
        error: String,
    },
}

impl Outcome {
    fn from_error(err: &Error) -> Self {
        let stage = match err {
            Error::Step(step) => step.stage(),
            _ => None,
        };
        Self::Failed {
            stage,
            error: err.to_string(),
        }
    }
}

/// One descriptor's run.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptorOutcome {
    pub descriptor: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub duration_ms: u128,
    /// Captured step output (matrix runs only)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transcript: String,
}

impl DescriptorOutcome {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Outcomes of a whole matrix, in matrix order.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixReport {
    pub started_at: String,
    pub outcomes: Vec<DescriptorOutcome>,
}

impl MatrixReport {
    /// True iff every descriptor passed.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(DescriptorOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &DescriptorOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }
}

/// Step runner in `dir` with the descriptor's variables exported.
pub fn descriptor_runner(config: &Config, descriptor: &EnvironmentDescriptor, dir: &Path) -> StepRunner {
    let runtime = descriptor.runtime_command(&config.runtime.command, &config.runtime.generic);
    StepRunner::new(dir)
        .env(constants::env::OS, descriptor.os.as_str())
        .env(constants::env::RUNTIME, runtime)
        .env(constants::env::RUNTIME_VERSION, descriptor.version.as_str())
        .env(constants::env::TOOLCHAIN, descriptor.toolchain.as_str())
        .env(constants::env::DESCRIPTOR, descriptor.id())
        .env(constants::env::CACHE_KEY, cache::key(descriptor))
}

/// Runs descriptors for one project.
pub struct MatrixRunner<'a> {
    config: &'a Config,
    project: PathBuf,
    state_dir: PathBuf,
}

impl<'a> MatrixRunner<'a> {
    /// Runner for the project rooted at `project`.
    ///
    /// Workspaces and the cache store live under `<project>/.brewgate`.
    pub fn new(config: &'a Config, project: impl Into<PathBuf>) -> Self {
        let project = project.into();
        let state_dir = project.join(constants::STATE_DIR);
        Self {
            config,
            project,
            state_dir,
        }
    }

    /// Use a different state directory.
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    /// The step sequence for one descriptor.
    fn execute(&self, descriptor: &EnvironmentDescriptor, runner: &StepRunner) -> Result<()> {
        let runtime = descriptor.runtime_command(&self.config.runtime.command, &self.config.runtime.generic);
        which::which(&runtime).map_err(|_| StepError::RuntimeNotFound(runtime.clone()))?;
        prepare::strategy_for(&descriptor.os, &self.config.prepare).prepare(runner)?;

        let steps = &self.config.steps;
        runner.run_all(Stage::Install, &steps.install)?;
        runner.run_all(Stage::Dependencies, &steps.dependencies)?;

        let _hidden = HiddenSource::hide(runner.dir(), self.config.project.source_dir())?;
        runner.run_all(Stage::Test, &steps.test)
    }

    /// Run one descriptor in the project directory itself.
    ///
    /// This is what a CI worker does: the scheduler already isolated the
    /// environment and persists caches, so only pruning happens here.
    pub fn run_in_place(&self, descriptor: &EnvironmentDescriptor) -> DescriptorOutcome {
        let start = Instant::now();
        let runner = descriptor_runner(self.config, descriptor, &self.project);

        info!(descriptor = %descriptor, "running");
        let outcome = match self.execute(descriptor, &runner) {
            Ok(()) => Outcome::Passed,
            Err(e) => Outcome::from_error(&e),
        };

        if let Err(e) = cache::prune(&self.project, None, &self.config.cache.prune) {
            warn!(error = %e, "cache prune failed");
        }

        DescriptorOutcome {
            descriptor: descriptor.id(),
            outcome,
            duration_ms: start.elapsed().as_millis(),
            transcript: String::new(),
        }
    }

    /// Run one descriptor in its own workspace with its own cache.
    ///
    /// Each worker also gets its own `HOME`, so `~/` cache directories are
    /// never shared between descriptors running side by side.
    fn run_isolated(&self, descriptor: &EnvironmentDescriptor, store: &CacheStore) -> DescriptorOutcome {
        let start = Instant::now();
        let key = cache::key(descriptor);
        let work_root = self.state_dir.join(constants::WORK_DIR);
        let home = work_root.join(format!("{}{}", descriptor.id(), constants::HOME_SUFFIX));

        let setup = workspace::create(&self.project, &work_root, descriptor).and_then(|dir| {
            if home.exists() {
                fs::remove_dir_all(&home)?;
            }
            fs::create_dir_all(&home)?;
            store.restore(&key, &self.config.cache, &dir, Some(&home))?;
            Ok(dir)
        });
        let dir = match setup {
            Ok(dir) => dir,
            Err(e) => {
                return DescriptorOutcome {
                    descriptor: descriptor.id(),
                    outcome: Outcome::from_error(&e),
                    duration_ms: start.elapsed().as_millis(),
                    transcript: String::new(),
                }
            }
        };

        let runner = descriptor_runner(self.config, descriptor, &dir)
            .env("HOME", home.to_string_lossy())
            .captured();
        let outcome = match self.execute(descriptor, &runner) {
            Ok(()) => Outcome::Passed,
            Err(e) => Outcome::from_error(&e),
        };
        debug!(descriptor = %descriptor, ?outcome, "descriptor finished");

        if let Err(e) = store.persist(&key, &self.config.cache, &dir, Some(&home)) {
            warn!(descriptor = %descriptor, error = %e, "cache persist failed");
        }
        if outcome == Outcome::Passed {
            for scratch in [&dir, &home] {
                if let Err(e) = fs::remove_dir_all(scratch) {
                    warn!(dir = %scratch.display(), error = %e, "failed to remove workspace");
                }
            }
        }

        DescriptorOutcome {
            descriptor: descriptor.id(),
            outcome,
            duration_ms: start.elapsed().as_millis(),
            transcript: runner.transcript(),
        }
    }

    /// Run every descriptor in parallel, each on its own worker.
    pub fn run_matrix(&self) -> MatrixReport {
        let started_at = chrono::Utc::now().to_rfc3339();
        let store = CacheStore::new(self.state_dir.join(constants::CACHE_DIR));
        info!(descriptors = self.config.matrix.len(), "running matrix");

        let outcomes = thread::scope(|scope| {
            let workers: Vec<_> = self
                .config
                .matrix
                .iter()
                .map(|descriptor| {
                    let store = &store;
                    (descriptor, scope.spawn(move || self.run_isolated(descriptor, store)))
                })
                .collect();

            workers
                .into_iter()
                .map(|(descriptor, worker)| {
                    worker.join().unwrap_or_else(|_| DescriptorOutcome {
                        descriptor: descriptor.id(),
                        outcome: Outcome::Failed {
                            stage: None,
                            error: "worker panicked".to_string(),
                        },
                        duration_ms: 0,
                        transcript: String::new(),
                    })
                })
                .collect()
        });

        MatrixReport {
            started_at,
            outcomes,
        }
    }
}
