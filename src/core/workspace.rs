//! Scratch workspaces.
//!
//! Matrix workers each get a private copy of the project tree so renames and
//! installs in one descriptor never touch another.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::core::constants;
use crate::core::domain::EnvironmentDescriptor;
use crate::error::{Result, StepError};

/// Copy `from` into `to`, skipping top-level entries named in `excludes`.
///
/// Symlinks are recreated rather than followed.
pub fn copy_tree(from: &Path, to: &Path, excludes: &[&str]) -> Result<u64> {
    let mut copied = 0;
    let walker = WalkDir::new(from).follow_links(false).into_iter();

    for entry in walker.filter_entry(|e| {
        e.depth() != 1
            || !excludes
                .iter()
                .any(|x| e.file_name().to_str() == Some(*x))
    }) {
        let entry = entry.map_err(|e| StepError::Workspace {
            path: from.to_path_buf(),
            reason: e.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| StepError::Workspace {
                path: entry.path().to_path_buf(),
                reason: e.to_string(),
            })?;
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
            copied += 1;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    trace!(from = %from.display(), to = %to.display(), files = copied, "copied tree");
    Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let points_to = fs::read_link(link)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    std::os::unix::fs::symlink(points_to, target)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    fs::copy(link, target)?;
    Ok(())
}

/// Create a fresh workspace for a descriptor under `work_root`.
///
/// Any previous workspace for the same descriptor is removed first.
pub fn create(project: &Path, work_root: &Path, descriptor: &EnvironmentDescriptor) -> Result<PathBuf> {
    let dir = work_root.join(descriptor.id());
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
    }
    fs::create_dir_all(&dir)?;

    let files = copy_tree(project, &dir, constants::WORKSPACE_EXCLUDES)?;
    debug!(descriptor = %descriptor, dir = %dir.display(), files, "workspace ready");
    Ok(dir)
}
