//! Run command - one environment, in place.

use std::path::Path;

use crate::cli::matrix::print_outcome;
use crate::cli::{project, ContextArgs};
use crate::core::config::Config;
use crate::core::domain::{BuildContext, EnvironmentDescriptor};
use crate::core::matrix::{DescriptorOutcome, MatrixRunner};
use crate::error::{ConfigError, Error, Result};

/// The matrix entry this build runs as.
pub(crate) fn select<'a>(config: &'a Config, ctx: &BuildContext) -> Result<&'a EnvironmentDescriptor> {
    let os = ctx.os.as_deref().ok_or_else(|| ConfigError::MissingContext {
        what: "operating system",
        var: config.context.os.clone(),
        flag: "os",
    })?;
    config.require_descriptor(os, ctx.version.as_deref().unwrap_or(""))
}

/// Run the selected environment and print its outcome.
pub(crate) fn run_selected(project: &project::Project, ctx: &BuildContext) -> Result<DescriptorOutcome> {
    let descriptor = select(&project.config, ctx)?;
    let outcome = MatrixRunner::new(&project.config, &project.root).run_in_place(descriptor);
    print_outcome(&outcome);
    Ok(outcome)
}

/// Run the suite for one environment in the project directory.
pub fn execute(context: &ContextArgs, config: Option<&Path>) -> Result<()> {
    let project = project::load(config)?;
    let ctx = context.resolve(&project.config);

    let outcome = run_selected(&project, &ctx)?;
    if !outcome.passed() {
        return Err(Error::Other(format!("{} failed", outcome.descriptor)));
    }
    Ok(())
}
