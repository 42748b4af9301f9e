//! Gate command - report whether this build publishes.

use std::path::Path;

use crate::cli::{output, project, ContextArgs};
use crate::core::gate::GateDecision;
use crate::error::Result;

/// Evaluate the release gate. A skip is not an error.
pub fn execute(context: &ContextArgs, config: Option<&Path>) -> Result<()> {
    let project = project::load(config)?;
    let ctx = context.resolve(&project.config);

    match project.config.release.evaluate(&ctx) {
        GateDecision::Publish => output::success("publish: this build releases the formula"),
        GateDecision::Skip(reason) => output::skip(&format!("skip: {}", reason)),
    }
    Ok(())
}
