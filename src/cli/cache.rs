//! Cache commands.

use std::path::Path;

use crate::cli::run::select;
use crate::cli::{output, project, ContextArgs};
use crate::core::cache;
use crate::error::Result;

/// Print cache keys, for the selected environment or the whole matrix.
pub fn key(context: &ContextArgs, config: Option<&Path>) -> Result<()> {
    let project = project::load(config)?;
    let config = &project.config;

    if context.os.is_some() {
        let ctx = context.resolve(config);
        let descriptor = select(config, &ctx)?;
        println!("{}", cache::key(descriptor));
        return Ok(());
    }

    for descriptor in &config.matrix {
        output::kv(&format!("{}:", descriptor.id()), cache::key(descriptor));
    }
    Ok(())
}

/// Delete files matching the prune patterns in the project.
pub fn prune(config: Option<&Path>) -> Result<()> {
    let project = project::load(config)?;
    let removed = cache::prune(&project.root, None, &project.config.cache.prune)?;

    if removed.is_empty() {
        output::dimmed("nothing to prune");
        return Ok(());
    }
    for path in &removed {
        let shown = path.strip_prefix(&project.root).unwrap_or(path);
        output::list_item(&shown.display().to_string());
    }
    output::success(&format!("pruned {} files", removed.len()));
    Ok(())
}
