//! Working-tree source hiding.
//!
//! While the suite runs, the in-tree package directory is renamed so the
//! tests import the installed package instead. The guard renames it back
//! when dropped, whether the suite passed, failed or panicked.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::constants;
use crate::error::{Result, StepError};

/// Renamed source directory; restored on drop.
#[derive(Debug)]
pub struct HiddenSource {
    original: PathBuf,
    hidden: PathBuf,
}

impl HiddenSource {
    /// Hide `root/<name>` by renaming it to `root/<name>_`.
    ///
    /// # Errors
    ///
    /// Returns `StepError::SourceMissing` if the directory does not exist and
    /// `StepError::SourceConflict` if the hidden name is already taken.
    pub fn hide(root: &Path, name: &str) -> Result<Self> {
        let original = root.join(name);
        let hidden = root.join(format!("{}{}", name, constants::HIDDEN_SUFFIX));

        if !original.is_dir() {
            return Err(StepError::SourceMissing(original).into());
        }
        if hidden.exists() {
            return Err(StepError::SourceConflict(hidden).into());
        }

        fs::rename(&original, &hidden)?;
        debug!(from = %original.display(), to = %hidden.display(), "source hidden");

        Ok(Self { original, hidden })
    }

    /// Path the source lives at while hidden.
    pub fn hidden_path(&self) -> &Path {
        &self.hidden
    }
}

impl Drop for HiddenSource {
    fn drop(&mut self) {
        match fs::rename(&self.hidden, &self.original) {
            Ok(()) => debug!(path = %self.original.display(), "source restored"),
            Err(e) => warn!(
                path = %self.original.display(),
                error = %e,
                "failed to restore source directory"
            ),
        }
    }
}
