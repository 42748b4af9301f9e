//! Dependency cache.
//!
//! Cache directories are stored per descriptor identity and restored into
//! the descriptor's workspace before it runs. Incidental noise (debug logs
//! and the like) is pruned before the directories are persisted again so the
//! cache does not grow with every run.
//!
//! Entries starting with `~/` live under a home directory. Matrix workers
//! pass their own so parallel environments never share one; `None` means
//! the user's home.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::core::config::CacheConfig;
use crate::core::constants;
use crate::core::domain::EnvironmentDescriptor;
use crate::core::workspace;
use crate::error::{ConfigError, Result};

/// Cache key for a descriptor: truncated hex sha256 of its identity.
pub fn key(descriptor: &EnvironmentDescriptor) -> String {
    let mut hasher = Sha256::new();
    hasher.update(descriptor.os.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(descriptor.version.as_bytes());
    hasher.update([0]);
    hasher.update(descriptor.toolchain.as_str().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..constants::CACHE_KEY_LEN].to_string()
}

/// Resolve a configured path against a workspace, expanding `~/` to `home`.
pub fn resolve(workspace: &Path, home: Option<&Path>, entry: &str) -> Result<PathBuf> {
    if let Some(rest) = entry.strip_prefix("~/") {
        let home = match home {
            Some(home) => home.to_path_buf(),
            None => dirs::home_dir().ok_or_else(|| ConfigError::InvalidValue {
                field: "cache",
                reason: "unable to determine home directory".to_string(),
            })?,
        };
        return Ok(home.join(rest));
    }
    Ok(workspace.join(entry))
}

/// Delete every file matching the prune patterns.
///
/// Returns the removed paths, sorted.
pub fn prune(workspace: &Path, home: Option<&Path>, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for pattern in patterns {
        let full = resolve(workspace, home, pattern)?;
        let full = full.to_string_lossy();
        let paths = glob::glob(&full).map_err(|e| ConfigError::InvalidValue {
            field: "cache.prune",
            reason: format!("{}: {}", pattern, e),
        })?;

        // Unreadable entries are skipped.
        for path in paths.flatten() {
            // Already gone with a directory matched earlier.
            if path.symlink_metadata().is_err() {
                continue;
            }
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
            trace!(path = %path.display(), "pruned");
            removed.push(path);
        }
    }

    removed.sort();
    debug!(removed = removed.len(), "cache pruned");
    Ok(removed)
}

/// On-disk cache store, one directory per cache key.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store directory for one configured cache directory.
    fn slot(&self, key: &str, entry: &str) -> PathBuf {
        let name: String = entry
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(key).join(name)
    }

    /// Copy stored directories into the workspace.
    ///
    /// Returns how many directories were restored.
    pub fn restore(
        &self,
        key: &str,
        config: &CacheConfig,
        workspace: &Path,
        home: Option<&Path>,
    ) -> Result<usize> {
        let mut restored = 0;
        for entry in &config.directories {
            let slot = self.slot(key, entry);
            if !slot.is_dir() {
                continue;
            }
            let target = resolve(workspace, home, entry)?;
            fs::create_dir_all(&target)?;
            workspace::copy_tree(&slot, &target, &[])?;
            restored += 1;
        }
        debug!(key, restored, "cache restored");
        Ok(restored)
    }

    /// Prune noise, then replace the stored directories with the
    /// workspace's copies.
    pub fn persist(
        &self,
        key: &str,
        config: &CacheConfig,
        workspace: &Path,
        home: Option<&Path>,
    ) -> Result<usize> {
        prune(workspace, home, &config.prune)?;

        let mut persisted = 0;
        for entry in &config.directories {
            let source = resolve(workspace, home, entry)?;
            if !source.is_dir() {
                continue;
            }
            let slot = self.slot(key, entry);
            if slot.exists() {
                fs::remove_dir_all(&slot)?;
            }
            fs::create_dir_all(&slot)?;
            workspace::copy_tree(&source, &slot, &[])?;
            persisted += 1;
        }
        debug!(key, persisted, "cache persisted");
        Ok(persisted)
    }
}
