//! Config and project root resolution shared by commands.

use std::path::{Path, PathBuf};

use crate::core::config::Config;
use crate::error::Result;

/// A loaded project.
pub struct Project {
    pub config: Config,
    /// Directory holding the config file; steps run here
    pub root: PathBuf,
}

/// Path of the config file, from `--config` or the current directory.
pub fn config_path(config: Option<&Path>) -> PathBuf {
    config.map(Path::to_path_buf).unwrap_or_else(Config::default_path)
}

/// Load the config and locate the project root next to it.
pub fn load(config: Option<&Path>) -> Result<Project> {
    let path = config_path(config);
    let config = Config::load(&path)?;

    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    let root = root.canonicalize()?;

    Ok(Project { config, root })
}
