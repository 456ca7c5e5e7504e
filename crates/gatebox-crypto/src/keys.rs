//! Curve25519 key material and its textual encoding.
//!
//! Keys travel as prefix-tagged lowercase hex (`public:<hex>`,
//! `private:<hex>`), which is what the gateway shows in its admin tools and
//! what key-cache files contain.

use std::{fmt, str::FromStr};

use zeroize::Zeroize;

use crate::error::CryptoError;

/// Size of public and private keys in bytes.
pub const KEY_SIZE: usize = 32;

const PUBLIC_PREFIX: &str = "public:";
const PRIVATE_PREFIX: &str = "private:";

/// A recipient's (or sender's) Curve25519 public key.
///
/// Equality is byte equality. Where the key came from is tracked separately
/// by the caller and never changes how the key is used.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; KEY_SIZE]);

impl PublicKey {
    /// Wrap raw key bytes.
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse raw key bytes of exactly [`KEY_SIZE`] length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::invalid_key(format!(
                "expected {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Parse `public:<hex>` or a bare 64-character hex string.
    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let encoded = encoded.trim();
        if encoded.starts_with(PRIVATE_PREFIX) {
            return Err(CryptoError::invalid_key("expected a public key, got a private key"));
        }
        let hex_part = encoded.strip_prefix(PUBLIC_PREFIX).unwrap_or(encoded);
        decode_hex(hex_part).map(Self)
    }

    /// Encode as `public:<hex>`.
    pub fn encode(&self) -> String {
        format!("{PUBLIC_PREFIX}{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}..)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// The gateway identity's Curve25519 private key.
///
/// Zeroized on drop. `Debug` never prints key bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey([u8; KEY_SIZE]);

impl PrivateKey {
    /// Wrap raw key bytes.
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Parse `private:<hex>`. The prefix is mandatory so a public key can
    /// never be mistaken for a private one.
    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let hex_part = encoded
            .trim()
            .strip_prefix(PRIVATE_PREFIX)
            .ok_or_else(|| CryptoError::invalid_key("private key must start with 'private:'"))?;
        decode_hex(hex_part).map(Self)
    }

    /// Encode as `private:<hex>`.
    pub fn encode(&self) -> String {
        format!("{PRIVATE_PREFIX}{}", hex::encode(self.0))
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> PublicKey {
        let secret = crypto_box::SecretKey::from(self.0);
        PublicKey(secret.public_key().to_bytes())
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// A private key together with its public key.
#[derive(Clone, Debug)]
pub struct KeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl KeyPair {
    /// Build a key pair from 32 random bytes.
    ///
    /// Caller MUST provide cryptographically secure random bytes in
    /// production.
    pub fn from_random(seed: [u8; KEY_SIZE]) -> Self {
        Self::from_private(PrivateKey::from_bytes(seed))
    }

    /// Build a key pair from an existing private key.
    pub fn from_private(private: PrivateKey) -> Self {
        let public = private.public_key();
        Self { private, public }
    }

    /// Private half.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// Public half.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}

fn decode_hex(hex_part: &str) -> Result<[u8; KEY_SIZE], CryptoError> {
    if hex_part.len() != KEY_SIZE * 2 {
        return Err(CryptoError::invalid_key(format!(
            "expected {} hex characters, got {}",
            KEY_SIZE * 2,
            hex_part.len()
        )));
    }
    let mut bytes = [0u8; KEY_SIZE];
    hex::decode_to_slice(hex_part, &mut bytes)
        .map_err(|e| CryptoError::invalid_key(format!("invalid hex: {e}")))?;
    Ok(bytes)
}
