//! Gatebox Cryptographic Primitives
//!
//! Cryptographic building blocks for end-to-end encrypted gateway messages.
//! Pure functions with deterministic outputs: callers provide random bytes
//! (nonces, blob keys, key seeds) so every operation can be tested with fixed
//! inputs. Production callers draw those bytes from a CSPRNG.
//!
//! # Layers
//!
//! ```text
//! plaintext payload ──► NaCl box (Curve25519 + XSalsa20-Poly1305) ──► nonce || ciphertext
//!        ▲
//!        │ embeds blob key + checksum
//!        │
//! blob bytes ──► XChaCha20-Poly1305 (fresh key per blob) ──► uploaded out-of-band
//! ```
//!
//! A message payload is sealed with the sender's private key and the
//! recipient's public key. Attachments are too large for the message path, so
//! each one is encrypted under its own random symmetric key; the key travels
//! inside the sealed payload.
//!
//! # Security
//!
//! - Nonces for the message box MUST be unique per key pair. The production
//!   path draws 24 random bytes for every message.
//! - Blob keys are used for exactly one blob, which is what makes the fixed
//!   per-kind blob nonce safe.
//! - Decryption fails closed: a tag mismatch or truncated input returns
//!   [`CryptoError::DecryptionFailed`] and no plaintext.
//! - Private and blob keys are zeroized on drop.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod blob;
mod error;
mod hash;
mod keys;
mod nacl_box;

pub use blob::{
    BLOB_KEY_SIZE, BlobKey, BlobKind, SealedBlob, decrypt_blob, derive_and_encrypt, encrypt_blob,
};
pub use error::CryptoError;
pub use hash::{CHECKSUM_SIZE, checksum, hash_email, hash_phone};
pub use keys::{KEY_SIZE, KeyPair, PrivateKey, PublicKey};
pub use nacl_box::{NONCE_SIZE, Nonce, TAG_SIZE, open, seal};
