//! CI command - the whole pipeline for one worker.
//!
//! Runs this environment's suite in place, then hands the result to the
//! gate. A failed suite fails the build and never publishes.

use std::path::Path;

use crate::cli::publish::publish_gated;
use crate::cli::run::run_selected;
use crate::cli::{project, ContextArgs};
use crate::error::{Error, Result};

pub fn execute(context: &ContextArgs, config: Option<&Path>) -> Result<()> {
    let project = project::load(config)?;
    let mut ctx = context.resolve(&project.config);

    let outcome = run_selected(&project, &ctx)?;
    ctx.suite_passed = outcome.passed();
    if !ctx.suite_passed {
        return Err(Error::Other(format!("{} failed", outcome.descriptor)));
    }

    publish_gated(&project, &ctx)
}
