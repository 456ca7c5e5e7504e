//! Public-key authenticated encryption (NaCl `crypto_box`).
//!
//! Curve25519 key agreement, XSalsa20 stream cipher, Poly1305 tag. The
//! shared key is symmetric: a box sealed with `(sender_private,
//! recipient_public)` opens with `(sender_public, recipient_private)` and
//! also with the sender's own pair, which is how a sender can audit what it
//! sent.
//!
//! All functions are pure - the nonce is provided by the caller.

use std::fmt;

use crypto_box::{SalsaBox, aead::Aead};

use crate::{
    error::CryptoError,
    keys::{PrivateKey, PublicKey},
};

/// Size of the box nonce (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// A 24-byte box nonce.
///
/// Must never repeat under the same key pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Wrap raw nonce bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse a nonce from a slice of exactly [`NONCE_SIZE`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Raw nonce bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", hex::encode(self.0))
    }
}

/// Seal `plaintext` for `recipient` under `nonce`.
///
/// Deterministic for a fixed nonce. Output is the authenticated ciphertext
/// (plaintext length + [`TAG_SIZE`]), without the nonce.
///
/// # Security
///
/// - Caller MUST use a fresh random nonce for every call in production
pub fn seal(
    plaintext: &[u8],
    sender: &PrivateKey,
    recipient: &PublicKey,
    nonce: &Nonce,
) -> Result<Vec<u8>, CryptoError> {
    let salsa_box = salsa_box(recipient, sender);
    salsa_box
        .encrypt(crypto_box::Nonce::from_slice(nonce.as_bytes()), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed { reason: e.to_string() })
}

/// Open a box sealed by `sender` for the holder of `recipient`.
///
/// # Errors
///
/// - `DecryptionFailed`: input shorter than the tag, wrong keys or any
///   modified byte
pub fn open(
    ciphertext: &[u8],
    nonce: &Nonce,
    sender: &PublicKey,
    recipient: &PrivateKey,
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::decryption(format!(
            "ciphertext truncated: {} bytes, need at least {TAG_SIZE}",
            ciphertext.len()
        )));
    }

    let salsa_box = salsa_box(sender, recipient);
    salsa_box
        .decrypt(crypto_box::Nonce::from_slice(nonce.as_bytes()), ciphertext)
        .map_err(|_| CryptoError::decryption("authentication failed"))
}

fn salsa_box(public: &PublicKey, private: &PrivateKey) -> SalsaBox {
    let public = crypto_box::PublicKey::from(*public.as_bytes());
    let secret = crypto_box::SecretKey::from(*private.as_bytes());
    SalsaBox::new(&public, &secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;

    fn pair(fill: u8) -> KeyPair {
        KeyPair::from_random([fill; 32])
    }

    #[test]
    fn seal_open_roundtrip() {
        let alice = pair(0x11);
        let bob = pair(0x22);
        let nonce = Nonce::from_bytes([0xAB; NONCE_SIZE]);

        let sealed = seal(b"Hello, World!", alice.private_key(), bob.public_key(), &nonce).unwrap();
        let opened = open(&sealed, &nonce, alice.public_key(), bob.private_key()).unwrap();

        assert_eq!(opened, b"Hello, World!");
    }

    #[test]
    fn sender_can_open_own_box() {
        let alice = pair(0x11);
        let bob = pair(0x22);
        let nonce = Nonce::from_bytes([0x01; NONCE_SIZE]);

        let sealed = seal(b"audit", alice.private_key(), bob.public_key(), &nonce).unwrap();
        let opened = open(&sealed, &nonce, bob.public_key(), alice.private_key()).unwrap();

        assert_eq!(opened, b"audit");
    }

    #[test]
    fn seal_is_deterministic_for_fixed_nonce() {
        let alice = pair(0x11);
        let bob = pair(0x22);
        let nonce = Nonce::from_bytes([0x00; NONCE_SIZE]);

        let first = seal(b"same", alice.private_key(), bob.public_key(), &nonce).unwrap();
        let second = seal(b"same", alice.private_key(), bob.public_key(), &nonce).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn ciphertext_is_plaintext_plus_tag() {
        let alice = pair(0x11);
        let bob = pair(0x22);
        let nonce = Nonce::from_bytes([0x00; NONCE_SIZE]);

        let sealed = seal(b"", alice.private_key(), bob.public_key(), &nonce).unwrap();
        assert_eq!(sealed.len(), TAG_SIZE);

        let sealed = seal(b"test message", alice.private_key(), bob.public_key(), &nonce).unwrap();
        assert_eq!(sealed.len(), b"test message".len() + TAG_SIZE);
    }

    #[test]
    fn wrong_recipient_fails() {
        let alice = pair(0x11);
        let bob = pair(0x22);
        let eve = pair(0x33);
        let nonce = Nonce::from_bytes([0x00; NONCE_SIZE]);

        let sealed = seal(b"secret", alice.private_key(), bob.public_key(), &nonce).unwrap();
        let result = open(&sealed, &nonce, alice.public_key(), eve.private_key());

        assert!(matches!(
            result,
            Err(CryptoError::DecryptionFailed { reason }) if reason.contains("authentication")
        ));
    }

    #[test]
    fn wrong_nonce_fails() {
        let alice = pair(0x11);
        let bob = pair(0x22);

        let sealed = seal(
            b"secret",
            alice.private_key(),
            bob.public_key(),
            &Nonce::from_bytes([0x00; NONCE_SIZE]),
        )
        .unwrap();
        let result = open(
            &sealed,
            &Nonce::from_bytes([0x01; NONCE_SIZE]),
            alice.public_key(),
            bob.private_key(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn truncated_input_fails() {
        let alice = pair(0x11);
        let bob = pair(0x22);
        let nonce = Nonce::from_bytes([0x00; NONCE_SIZE]);

        let result = open(&[0u8; TAG_SIZE - 1], &nonce, alice.public_key(), bob.private_key());

        assert!(matches!(
            result,
            Err(CryptoError::DecryptionFailed { reason }) if reason.contains("truncated")
        ));
    }

    #[test]
    fn nonce_from_slice_checks_length() {
        assert!(Nonce::from_slice(&[0u8; 23]).is_none());
        assert!(Nonce::from_slice(&[0u8; 24]).is_some());
    }
}
