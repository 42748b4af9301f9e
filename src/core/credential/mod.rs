//! Deploy credential handling.
//!
//! The formula repository is pushed to with a deploy key committed in
//! encrypted form. The secret needed to decrypt it is handed in explicitly;
//! the plaintext only ever exists in a [`CredentialFile`], which is
//! owner-read-only while it lives and is wiped when dropped.
//!
//! ## Backends
//!
//! - **aes-256-cbc**: hex key and IV, decrypted through the `openssl` CLI.
//!   This is the format CI secret-encryption tools produce.
//! - **age**: passphrase (scrypt) encrypted, decrypted natively.

mod age;
mod file;
mod openssl;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::config::CredentialConfig;
use crate::error::{CredentialError, Result};

pub use self::age::AgePassphrase;
pub use file::CredentialFile;
pub use openssl::OpensslAes;

/// Cipher protecting the committed credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherKind {
    #[default]
    #[serde(rename = "aes-256-cbc")]
    Aes256Cbc,
    #[serde(rename = "age")]
    Age,
}

/// Decrypts the committed credential.
pub trait CredentialCipher {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Decrypt the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::DecryptionFailed` if the secret is wrong or
    /// the file is corrupt. The error never contains secret material.
    fn decrypt(&self, path: &Path) -> Result<Zeroizing<Vec<u8>>>;
}

/// Secret material for decrypting the credential.
pub enum CredentialSecret {
    Aes256Cbc {
        key: Zeroizing<String>,
        iv: Zeroizing<String>,
    },
    Age {
        passphrase: Zeroizing<String>,
    },
}

impl fmt::Debug for CredentialSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aes256Cbc { .. } => f.write_str("CredentialSecret::Aes256Cbc(<redacted>)"),
            Self::Age { .. } => f.write_str("CredentialSecret::Age(<redacted>)"),
        }
    }
}

impl CredentialSecret {
    /// Read the secret from the variables named in the config.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::MissingSecret` naming the unset variable.
    pub fn from_lookup(config: &CredentialConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |var: &Option<String>, field: &str| -> Result<Zeroizing<String>> {
            let var = var
                .as_deref()
                .ok_or_else(|| CredentialError::MissingSecret(field.to_string()))?;
            lookup(var)
                .filter(|v| !v.is_empty())
                .map(Zeroizing::new)
                .ok_or_else(|| CredentialError::MissingSecret(var.to_string()).into())
        };

        match config.cipher {
            CipherKind::Aes256Cbc => Ok(Self::Aes256Cbc {
                key: read(&config.key_env, "key_env")?,
                iv: read(&config.iv_env, "iv_env")?,
            }),
            CipherKind::Age => Ok(Self::Age {
                passphrase: read(&config.passphrase_env, "passphrase_env")?,
            }),
        }
    }

    /// Backend for this secret.
    pub fn cipher(&self) -> Result<Box<dyn CredentialCipher + '_>> {
        match self {
            Self::Aes256Cbc { key, iv } => Ok(Box::new(OpensslAes::new(key, iv)?)),
            Self::Age { passphrase } => Ok(Box::new(AgePassphrase::new(passphrase))),
        }
    }

    pub fn kind(&self) -> CipherKind {
        match self {
            Self::Aes256Cbc { .. } => CipherKind::Aes256Cbc,
            Self::Age { .. } => CipherKind::Age,
        }
    }
}

/// Decrypt `encrypted` into a new owner-read-only file at `dest`.
///
/// # Errors
///
/// Returns `CredentialError::NotFound` if the encrypted file is missing, or
/// the backend's error if decryption fails. No file is left behind on error.
pub fn decrypt_to(encrypted: &Path, secret: &CredentialSecret, dest: &Path) -> Result<CredentialFile> {
    if !encrypted.is_file() {
        return Err(CredentialError::NotFound(encrypted.to_path_buf()).into());
    }

    let cipher = secret.cipher()?;
    debug!(cipher = cipher.name(), path = %encrypted.display(), "decrypting credential");

    let plaintext = cipher.decrypt(encrypted)?;
    let file = CredentialFile::create(dest, &plaintext)?;

    debug!(path = %file.path().display(), "credential ready");
    Ok(file)
}
