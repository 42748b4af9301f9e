//! Environment preparation.
//!
//! Each operating system gets its own preparation routine. Systems with no
//! routine are prepared by doing nothing.
//!
//! ## Adding a New Strategy
//!
//! 1. Add an `OperatingSystem` variant
//! 2. Implement `Prepare` for a new type
//! 3. Return it from [`strategy_for`]

use tracing::debug;

use crate::core::config::PrepareConfig;
use crate::core::domain::OperatingSystem;
use crate::core::step::StepRunner;
use crate::error::{Result, Stage};

/// Preparation routine for one kind of environment.
pub trait Prepare {
    /// Strategy name for logs.
    fn name(&self) -> &'static str;

    /// Run the routine.
    ///
    /// # Errors
    ///
    /// Returns a `StepError` for the `prepare` stage if any step fails.
    fn prepare(&self, runner: &StepRunner) -> Result<()>;
}

/// Linux preparation routine.
pub struct LinuxPrepare {
    steps: Vec<String>,
}

impl Prepare for LinuxPrepare {
    fn name(&self) -> &'static str {
        "linux"
    }

    fn prepare(&self, runner: &StepRunner) -> Result<()> {
        runner.run_all(Stage::Prepare, &self.steps)
    }
}

/// OSX preparation routine.
pub struct OsxPrepare {
    steps: Vec<String>,
}

impl Prepare for OsxPrepare {
    fn name(&self) -> &'static str {
        "osx"
    }

    fn prepare(&self, runner: &StepRunner) -> Result<()> {
        runner.run_all(Stage::Prepare, &self.steps)
    }
}

/// Used for systems with no routine.
pub struct NoPrepare;

impl Prepare for NoPrepare {
    fn name(&self) -> &'static str {
        "none"
    }

    fn prepare(&self, _runner: &StepRunner) -> Result<()> {
        Ok(())
    }
}

/// Select the preparation routine for an operating system.
pub fn strategy_for(os: &OperatingSystem, config: &PrepareConfig) -> Box<dyn Prepare> {
    let strategy: Box<dyn Prepare> = match os {
        OperatingSystem::Linux => Box::new(LinuxPrepare {
            steps: config.linux.clone(),
        }),
        OperatingSystem::Osx => Box::new(OsxPrepare {
            steps: config.osx.clone(),
        }),
        OperatingSystem::Other(_) => Box::new(NoPrepare),
    };
    debug!(os = %os, strategy = strategy.name(), "selected preparation");
    strategy
}
