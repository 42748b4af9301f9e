//! Age passphrase credential backend.
//!
//! Decrypts age files encrypted with a passphrase (`age -p`), armored or
//! binary.

use std::io::Read;
use std::path::Path;

use ::age::secrecy::SecretString;
use tracing::trace;
use zeroize::Zeroizing;

use super::CredentialCipher;
use crate::error::{CredentialError, Result};

/// Passphrase-based age backend.
pub struct AgePassphrase<'a> {
    passphrase: &'a str,
}

impl<'a> AgePassphrase<'a> {
    pub fn new(passphrase: &'a str) -> Self {
        Self { passphrase }
    }
}

impl CredentialCipher for AgePassphrase<'_> {
    fn name(&self) -> &'static str {
        "age"
    }

    fn decrypt(&self, path: &Path) -> Result<Zeroizing<Vec<u8>>> {
        let encrypted = std::fs::read(path)?;
        trace!(ciphertext_len = encrypted.len(), "decrypting");

        let identity = ::age::scrypt::Identity::new(SecretString::from(self.passphrase.to_string()));
        let reader = ::age::armor::ArmoredReader::new(encrypted.as_slice());
        let decryptor = ::age::Decryptor::new(reader)
            .map_err(|e| CredentialError::DecryptionFailed(format!("{}", e)))?;

        let mut reader = decryptor
            .decrypt(std::iter::once(&identity as &dyn ::age::Identity))
            .map_err(|e| CredentialError::DecryptionFailed(format!("{}", e)))?;

        let mut decrypted = Zeroizing::new(Vec::new());
        reader
            .read_to_end(&mut decrypted)
            .map_err(|e| CredentialError::DecryptionFailed(format!("{}", e)))?;

        trace!(plaintext_len = decrypted.len(), "decrypted");
        if decrypted.is_empty() {
            return Err(CredentialError::DecryptionFailed("credential is empty".to_string()).into());
        }
        Ok(decrypted)
    }
}
