//! Sealed payload as it travels to the gateway.

use bytes::{BufMut, Bytes, BytesMut};
use gatebox_crypto::{NONCE_SIZE, Nonce, TAG_SIZE};

use crate::errors::{ProtocolError, Result};

/// Nonce plus box ciphertext. Produced once per send and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    nonce: Nonce,
    ciphertext: Bytes,
}

impl EncryptedPayload {
    /// Pair a nonce with the ciphertext it sealed.
    pub fn new(nonce: Nonce, ciphertext: impl Into<Bytes>) -> Self {
        Self { nonce, ciphertext: ciphertext.into() }
    }

    /// Nonce used for the box.
    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    /// Authenticated ciphertext (plaintext length + 16-byte tag).
    pub fn ciphertext(&self) -> &Bytes {
        &self.ciphertext
    }

    /// Wire form: `nonce || ciphertext`.
    pub fn to_wire(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(NONCE_SIZE + self.ciphertext.len());
        buf.put_slice(self.nonce.as_bytes());
        buf.put_slice(&self.ciphertext);
        buf.freeze()
    }

    /// Parse the wire form.
    ///
    /// # Errors
    ///
    /// - `MalformedPayload` if the input cannot hold a nonce and a tag
    pub fn from_wire(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(ProtocolError::MalformedPayload(format!(
                "sealed payload is {} bytes, need at least {}",
                bytes.len(),
                NONCE_SIZE + TAG_SIZE
            )));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce)
            .ok_or_else(|| ProtocolError::MalformedPayload("bad nonce".to_string()))?;

        Ok(Self { nonce, ciphertext: Bytes::copy_from_slice(ciphertext) })
    }
}
