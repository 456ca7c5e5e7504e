//! Error types for cryptographic operations

use thiserror::Error;

/// Errors from key handling, sealing and opening.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key material could not be parsed (wrong prefix, length or encoding)
    #[error("invalid key format: {reason}")]
    InvalidKeyFormat {
        /// What was wrong with the key
        reason: String,
    },

    /// Encryption failed. Cannot happen for in-memory buffers but the AEAD
    /// API is fallible.
    #[error("encryption failed: {reason}")]
    EncryptionFailed {
        /// Reason reported by the cipher
        reason: String,
    },

    /// Decryption failed (authentication tag mismatch, wrong key, truncated
    /// input or checksum mismatch)
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// Reason for decryption failure
        reason: String,
    },
}

impl CryptoError {
    pub(crate) fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKeyFormat { reason: reason.into() }
    }

    pub(crate) fn decryption(reason: impl Into<String>) -> Self {
        Self::DecryptionFailed { reason: reason.into() }
    }
}
