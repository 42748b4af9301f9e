//! Init command - write a starter config.

use std::path::Path;
use tracing::info;

use crate::cli::{output, project};
use crate::core::config::{template, Config};
use crate::error::{ConfigError, Result};

/// Write `.brewgate.toml` for the package.
pub fn execute(name: Option<String>, force: bool, config: Option<&Path>) -> Result<()> {
    let path = project::config_path(config);
    if path.exists() && !force {
        return Err(ConfigError::AlreadyInitialized(path).into());
    }

    let name = match name {
        Some(name) => name,
        None => std::env::current_dir()?
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ConfigError::MissingField { field: "project.name" })?,
    };
    info!(package = %name, "writing config");

    let contents = template(&name);
    // Refuse to write a template that would not load back.
    Config::parse(&contents)?;
    std::fs::write(&path, contents)?;

    output::success(&format!("initialized {}", output::path(&path.display().to_string())));
    output::hint("edit the [steps] and [publish] sections, then run: brewgate matrix");
    Ok(())
}
