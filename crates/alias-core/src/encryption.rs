//! Password decryption collaborator

use crate::error::EncryptionError;

/// Decrypts password values encrypted in a model
///
/// Invoked only for password-typed attributes, synchronously and without
/// retry.
pub trait PasswordDecryptor: Send + Sync {
    /// True when `text` is not encrypted
    fn is_plain_or_unencrypted(&self, text: &str) -> bool;

    /// Decrypt `text` with `passphrase`
    ///
    /// # Errors
    /// Returns [`EncryptionError`] if the text or passphrase is rejected
    fn decrypt(&self, text: &str, passphrase: &str) -> Result<String, EncryptionError>;
}

/// Decryptor that treats every value as plain text
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl PasswordDecryptor for PlainText {
    fn is_plain_or_unencrypted(&self, _text: &str) -> bool {
        true
    }

    fn decrypt(&self, text: &str, _passphrase: &str) -> Result<String, EncryptionError> {
        Ok(text.to_string())
    }
}

/// Decryption settings
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncryptionConfig {
    /// Decrypt encrypted passwords before writing
    pub enabled: bool,

    /// Passphrase handed to the decryptor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

impl EncryptionConfig {
    /// Enabled with `passphrase`
    #[must_use]
    pub fn with_passphrase(passphrase: impl Into<String>) -> Self {
        Self {
            enabled: true,
            passphrase: Some(passphrase.into()),
        }
    }
}
