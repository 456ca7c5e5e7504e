//! Message box and blob encryption with fresh randomness.
//!
//! Thin layer over `gatebox-crypto` that draws every nonce and blob key from
//! the [`Environment`]. The pure functions underneath take their randomness
//! as arguments; this is the only place it is produced.

use gatebox_crypto::{
    BLOB_KEY_SIZE, BlobKind, NONCE_SIZE, Nonce, PrivateKey, PublicKey, SealedBlob,
};
use gatebox_proto::EncryptedPayload;

use crate::{env::Environment, error::ClientError};

/// Encrypts outgoing payloads and blobs.
#[derive(Debug, Clone)]
pub struct CryptoBox<E> {
    env: E,
}

impl<E: Environment> CryptoBox<E> {
    /// Create a crypto box drawing randomness from `env`.
    pub fn new(env: E) -> Self {
        Self { env }
    }

    /// Draw a fresh 24-byte nonce.
    pub fn fresh_nonce(&self) -> Nonce {
        Nonce::from_bytes(self.env.random_array::<NONCE_SIZE>())
    }

    /// Seal `plaintext` from `sender` to `recipient` under a fresh nonce.
    ///
    /// # Errors
    ///
    /// - `EncryptionFailed`: the cipher refused the input
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        sender: &PrivateKey,
        recipient: &PublicKey,
    ) -> Result<EncryptedPayload, ClientError> {
        let nonce = self.fresh_nonce();
        let ciphertext = gatebox_crypto::seal(plaintext, sender, recipient, &nonce)?;
        Ok(EncryptedPayload::new(nonce, ciphertext))
    }

    /// Open a box `sender` sealed for the holder of `recipient`.
    ///
    /// # Errors
    ///
    /// - `DecryptionFailed`: wrong keys, modified or truncated ciphertext
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        nonce: &Nonce,
        sender: &PublicKey,
        recipient: &PrivateKey,
    ) -> Result<Vec<u8>, ClientError> {
        Ok(gatebox_crypto::open(ciphertext, nonce, sender, recipient)?)
    }

    /// Encrypt a blob under a freshly drawn key.
    ///
    /// The returned key must be embedded in the message payload; it is the
    /// only way to decrypt the blob.
    pub fn derive_and_encrypt(
        &self,
        plaintext: &[u8],
        kind: BlobKind,
    ) -> Result<SealedBlob, ClientError> {
        let key_bytes = self.env.random_array::<BLOB_KEY_SIZE>();
        Ok(gatebox_crypto::derive_and_encrypt(plaintext, key_bytes, kind)?)
    }
}
