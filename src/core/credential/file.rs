//! Scoped plaintext credential file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

use crate::error::{CredentialError, Result};

/// Decrypted credential on disk.
///
/// Owner-read-only from creation until drop. Dropping overwrites the
/// contents and removes the file.
#[derive(Debug)]
pub struct CredentialFile {
    path: PathBuf,
    len: usize,
}

impl CredentialFile {
    /// Create a new file at `path` holding `contents`.
    ///
    /// The file must not exist yet.
    pub fn create(path: &Path, contents: &[u8]) -> Result<Self> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path).map_err(CredentialError::WriteFailed)?;
        // From here on the guard owns the path, so a failed write still cleans up.
        let guard = Self {
            path: path.to_path_buf(),
            len: contents.len(),
        };
        file.write_all(contents).map_err(CredentialError::WriteFailed)?;
        file.sync_all().map_err(CredentialError::WriteFailed)?;
        drop(file);

        guard.restrict()?;
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(unix)]
    fn restrict(&self) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        use crate::core::constants::CREDENTIAL_MODE;

        fs::set_permissions(&self.path, fs::Permissions::from_mode(CREDENTIAL_MODE))
            .map_err(CredentialError::WriteFailed)?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn restrict(&self) -> Result<()> {
        Ok(())
    }

    /// Check the file is still owner-read-only.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidPermissions` if the mode changed.
    #[cfg(unix)]
    pub fn verify(&self) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        use crate::core::constants::CREDENTIAL_MODE;

        let actual = fs::metadata(&self.path)?.permissions().mode() & 0o777;
        if actual != CREDENTIAL_MODE {
            return Err(CredentialError::InvalidPermissions {
                path: self.path.display().to_string(),
                expected: format!("{:o}", CREDENTIAL_MODE),
                actual: format!("{:o}", actual),
            }
            .into());
        }
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn verify(&self) -> Result<()> {
        Ok(())
    }

    fn wipe(&self) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        let mut file = fs::OpenOptions::new().write(true).open(&self.path)?;
        file.write_all(&vec![0u8; self.len])?;
        file.sync_all()?;
        drop(file);
        fs::remove_file(&self.path)
    }
}

impl Drop for CredentialFile {
    fn drop(&mut self) {
        match self.wipe() {
            Ok(()) => trace!(path = %self.path.display(), "credential removed"),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to wipe credential");
                let _ = fs::remove_file(&self.path);
            }
        }
    }
}
