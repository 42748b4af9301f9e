//! Publish command - gate, then generate and push the formula.

use std::path::Path;
use tracing::info;

use crate::cli::formula::display;
use crate::cli::project::Project;
use crate::cli::{output, project, ContextArgs};
use crate::core::credential::CredentialSecret;
use crate::core::domain::BuildContext;
use crate::core::gate::GateDecision;
use crate::core::publish::{PublishOutcome, Publisher};
use crate::error::Result;

/// Publish if the gate allows it.
///
/// The credential secret is only read once the gate passes, so builds that
/// never publish need no secrets in their environment.
pub(crate) fn publish_gated(project: &Project, ctx: &BuildContext) -> Result<()> {
    let config = &project.config;
    if let GateDecision::Skip(reason) = config.release.evaluate(ctx) {
        info!(%reason, "publish skipped");
        output::skip(&format!("publish skipped: {}", reason));
        return Ok(());
    }

    let secret = CredentialSecret::from_lookup(&config.publish.credential, |name| {
        std::env::var(name).ok()
    })?;
    let publisher = Publisher::new(config, &project.root, secret);

    match publisher.publish_with(ctx, display)? {
        PublishOutcome::Published { message } => {
            output::success(&format!(
                "published {} to {}",
                output::path(&config.publish.formula),
                output::path(&config.publish.repository)
            ));
            output::kv("commit:", message);
        }
        PublishOutcome::Unchanged => {
            output::warn("formula unchanged, nothing committed");
        }
    }
    Ok(())
}

pub fn execute(context: &ContextArgs, config: Option<&Path>) -> Result<()> {
    let project = project::load(config)?;
    let ctx = context.resolve(&project.config);
    publish_gated(&project, &ctx)
}
