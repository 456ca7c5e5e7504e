//! Recipient public-key resolution.
//!
//! A key comes from exactly one place, chosen by the caller per message:
//! an explicit value, a local key cache file, or the gateway's public-key
//! endpoint. A failing explicit or file source is reported as is; it never
//! falls back to a remote lookup.

use std::path::{Path, PathBuf};

use gatebox_crypto::PublicKey;
use gatebox_proto::RecipientId;

use crate::{
    error::ClientError,
    gateway::{KeyLookup, LookupError},
};

/// Caller's choice of where a recipient's public key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyHint {
    /// Key given inline as `public:<hex>` or 64 hex characters
    Explicit(String),
    /// Path of a single-record key cache file
    CacheFile(PathBuf),
    /// Ask the gateway
    Lookup,
}

/// Where a resolved key came from. Diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySource {
    /// Supplied by the caller
    Explicit,
    /// Read from a key cache file
    CacheFile,
    /// Fetched from the gateway
    Remote,
    /// Served by an in-memory [`KeyCache`](crate::KeyCache)
    Memory,
}

/// Public key together with its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedKey {
    /// Recipient public key
    pub key: PublicKey,
    /// Where it came from
    pub source: KeySource,
}

/// Resolves recipient public keys.
///
/// Holds no state besides the lookup capability; remote results are not
/// cached here. Wrap in a [`KeyCache`](crate::KeyCache) for that.
#[derive(Debug, Clone)]
pub struct KeyStore<L> {
    lookup: L,
}

impl<L: KeyLookup> KeyStore<L> {
    /// Create a key store over the given lookup capability.
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Resolve the key for `recipient`.
    ///
    /// Precedence: `explicit`, then `cache_file`, then a remote lookup.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyFormat`: malformed explicit key or key file record
    /// - `KeyFileNotFound`: key file missing or unreadable
    /// - `RecipientNotFound`: gateway has no such ID
    /// - `LookupFailed`: lookup transport failure
    pub async fn resolve(
        &self,
        recipient: &RecipientId,
        explicit: Option<&str>,
        cache_file: Option<&Path>,
    ) -> Result<ResolvedKey, ClientError> {
        if let Some(encoded) = explicit {
            let key = PublicKey::decode(encoded)?;
            return Ok(ResolvedKey { key, source: KeySource::Explicit });
        }

        if let Some(path) = cache_file {
            let key = read_key_file(path, recipient).await?;
            return Ok(ResolvedKey { key, source: KeySource::CacheFile });
        }

        let key = self.lookup.lookup_public_key(recipient).await.map_err(|e| match e {
            LookupError::NotFound => {
                ClientError::RecipientNotFound { recipient: recipient.to_string() }
            },
            LookupError::Transport(reason) => ClientError::LookupFailed { reason },
        })?;

        tracing::debug!(recipient = %recipient, "fetched public key from gateway");
        Ok(ResolvedKey { key, source: KeySource::Remote })
    }

    /// Resolve the key for `recipient` as directed by `hint`.
    pub async fn resolve_hint(
        &self,
        recipient: &RecipientId,
        hint: &KeyHint,
    ) -> Result<ResolvedKey, ClientError> {
        match hint {
            KeyHint::Explicit(encoded) => {
                self.resolve(recipient, Some(encoded.as_str()), None).await
            },
            KeyHint::CacheFile(path) => self.resolve(recipient, None, Some(path.as_path())).await,
            KeyHint::Lookup => self.resolve(recipient, None, None).await,
        }
    }
}

/// Read and parse a key cache file.
///
/// The record is `<key>` or `<ID><whitespace><key>`; surrounding whitespace
/// is ignored.
async fn read_key_file(path: &Path, recipient: &RecipientId) -> Result<PublicKey, ClientError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| ClientError::KeyFileNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let contents = String::from_utf8(bytes).map_err(|e| ClientError::InvalidKeyFormat {
        reason: format!("key file is not UTF-8: {e}"),
    })?;

    parse_key_record(&contents, recipient)
}

fn parse_key_record(contents: &str, recipient: &RecipientId) -> Result<PublicKey, ClientError> {
    let mut fields = contents.split_whitespace();

    let (id, key) = match (fields.next(), fields.next(), fields.next()) {
        (Some(key), None, None) => (None, key),
        (Some(id), Some(key), None) => (Some(id), key),
        (None, ..) => {
            return Err(ClientError::InvalidKeyFormat { reason: "key file is empty".to_string() });
        },
        (Some(_), _, Some(_)) => {
            return Err(ClientError::InvalidKeyFormat {
                reason: "key file has more than one record".to_string(),
            });
        },
    };

    if let Some(id) = id
        && id != recipient.as_str()
    {
        return Err(ClientError::InvalidKeyFormat {
            reason: format!("key file is for {id}, not {recipient}"),
        });
    }

    Ok(PublicKey::decode(key)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ECHO_KEY: &str = "4a6a1b34dcef15d43cb74de2fd36091be99fbbaf126d099d47d83d919712c72b";

    fn echo() -> RecipientId {
        RecipientId::new("ECHOECHO").unwrap()
    }

    #[test]
    fn bare_record() {
        let key = parse_key_record(&format!("{ECHO_KEY}\n"), &echo()).unwrap();
        assert_eq!(key.encode(), format!("public:{ECHO_KEY}"));
    }

    #[test]
    fn record_with_matching_id() {
        let key = parse_key_record(&format!("ECHOECHO public:{ECHO_KEY}"), &echo()).unwrap();
        assert_eq!(hex::encode(key.as_bytes()), ECHO_KEY);
    }

    #[test]
    fn record_with_other_id_is_rejected() {
        let err = parse_key_record(&format!("OTHER123 {ECHO_KEY}"), &echo()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidKeyFormat { .. }));
    }

    #[test]
    fn empty_and_garbage_records_are_rejected() {
        for contents in ["", "   \n", "not-a-key", "ECHOECHO abc", "a b c", "a b c d"] {
            let err = parse_key_record(contents, &echo()).unwrap_err();
            assert!(
                matches!(err, ClientError::InvalidKeyFormat { .. }),
                "{contents:?} should be rejected, got {err:?}"
            );
        }
    }
}
