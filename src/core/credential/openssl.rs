//! AES-256-CBC credential backend.
//!
//! Decrypts with the `openssl` CLI, matching files produced by
//! `openssl aes-256-cbc -K <key> -iv <iv> -in key -out key.enc`.
//!
//! ## Requirements
//!
//! - `openssl` CLI must be installed
//! - Key is 64 hex digits, IV is 32 hex digits

use std::process::{Command, Stdio};
use zeroize::Zeroizing;

use super::CredentialCipher;
use crate::error::{CredentialError, Result};

/// AES-256-CBC backend using the openssl CLI.
pub struct OpensslAes<'a> {
    key: &'a str,
    iv: &'a str,
}

impl<'a> OpensslAes<'a> {
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidSecret` if the key or IV is not hex
    /// of the right length.
    pub fn new(key: &'a str, iv: &'a str) -> Result<Self> {
        check_hex("key", key.trim(), 64)?;
        check_hex("iv", iv.trim(), 32)?;
        Ok(Self {
            key: key.trim(),
            iv: iv.trim(),
        })
    }

    fn check_openssl() -> Result<()> {
        which::which("openssl").map_err(|_| {
            CredentialError::DecryptionFailed("openssl CLI not found on PATH".to_string())
        })?;
        Ok(())
    }
}

fn check_hex(what: &str, value: &str, len: usize) -> Result<()> {
    if value.len() != len || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CredentialError::InvalidSecret(format!(
            "{} must be {} hex digits",
            what, len
        ))
        .into());
    }
    Ok(())
}

impl CredentialCipher for OpensslAes<'_> {
    fn name(&self) -> &'static str {
        "aes-256-cbc"
    }

    fn decrypt(&self, path: &std::path::Path) -> Result<Zeroizing<Vec<u8>>> {
        Self::check_openssl()?;

        // Not traced: the key and IV are on this command line.
        let output = Command::new("openssl")
            .args(["enc", "-d", "-aes-256-cbc", "-K", self.key, "-iv", self.iv, "-in"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| CredentialError::DecryptionFailed(format!("failed to spawn openssl: {}", e)))?;

        let plaintext = Zeroizing::new(output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CredentialError::DecryptionFailed(format!(
                "openssl exited with {}: {}",
                output.status,
                stderr.lines().next().unwrap_or("no output")
            ))
            .into());
        }
        if plaintext.is_empty() {
            return Err(CredentialError::DecryptionFailed("credential is empty".to_string()).into());
        }

        Ok(plaintext)
    }
}
