//! Attachment (blob) encryption using `XChaCha20-Poly1305`
//!
//! Every blob gets its own random 32-byte key, so a fixed nonce per blob kind
//! never repeats under a key. The key is embedded in the message payload,
//! which is sealed by the outer box.
//!
//! All functions are pure - key bytes must be provided by the caller.

use std::fmt;

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use zeroize::Zeroize;

use crate::{
    error::CryptoError,
    hash::{CHECKSUM_SIZE, checksum},
};

/// Size of a blob key in bytes.
pub const BLOB_KEY_SIZE: usize = 32;

/// What a blob carries. Selects the fixed nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobKind {
    /// Image message content
    Image,
    /// File message content
    File,
    /// Thumbnail attached to a file message
    Thumbnail,
}

impl BlobKind {
    /// 24-byte nonce for this kind: `00..01` for content, `00..02` for
    /// thumbnails.
    fn nonce(self) -> [u8; 24] {
        let mut nonce = [0u8; 24];
        nonce[23] = match self {
            Self::Image | Self::File => 0x01,
            Self::Thumbnail => 0x02,
        };
        nonce
    }
}

/// Symmetric key protecting exactly one blob.
#[derive(Clone, PartialEq, Eq)]
pub struct BlobKey([u8; BLOB_KEY_SIZE]);

impl BlobKey {
    /// Wrap raw key bytes.
    pub const fn from_bytes(bytes: [u8; BLOB_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; BLOB_KEY_SIZE] {
        &self.0
    }
}

impl Drop for BlobKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlobKey(..)")
    }
}

/// Result of encrypting a blob under a fresh key.
#[derive(Debug, Clone)]
pub struct SealedBlob {
    /// Key the blob was encrypted with
    pub key: BlobKey,
    /// Ciphertext including the 16-byte Poly1305 tag
    pub ciphertext: Vec<u8>,
    /// Truncated SHA-256 of the plaintext
    pub checksum: [u8; CHECKSUM_SIZE],
    /// Plaintext length in bytes
    pub plaintext_len: usize,
}

/// Encrypt a blob under a key built from `key_bytes`.
///
/// Returns the key together with the ciphertext and the plaintext checksum so
/// the caller can embed all three in the message payload.
///
/// # Security
///
/// - `key_bytes` MUST be fresh cryptographically secure random bytes; the
///   nonce is fixed per kind
pub fn derive_and_encrypt(
    plaintext: &[u8],
    key_bytes: [u8; BLOB_KEY_SIZE],
    kind: BlobKind,
) -> Result<SealedBlob, CryptoError> {
    let key = BlobKey::from_bytes(key_bytes);
    let ciphertext = encrypt_blob(plaintext, &key, kind)?;

    Ok(SealedBlob {
        key,
        ciphertext,
        checksum: checksum(plaintext),
        plaintext_len: plaintext.len(),
    })
}

/// Encrypt `plaintext` under `key` with the nonce for `kind`.
pub fn encrypt_blob(
    plaintext: &[u8],
    key: &BlobKey,
    kind: BlobKind,
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = kind.nonce();

    cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed { reason: e.to_string() })
}

/// Decrypt a blob.
///
/// # Errors
///
/// - `DecryptionFailed`: wrong key, wrong kind, truncated or modified input
pub fn decrypt_blob(
    ciphertext: &[u8],
    key: &BlobKey,
    kind: BlobKind,
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = kind.nonce();

    cipher
        .decrypt(XNonce::from_slice(&nonce), ciphertext)
        .map_err(|_| CryptoError::decryption("blob authentication failed"))
}
