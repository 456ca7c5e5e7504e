//! Identity directory lookups.
//!
//! Phone numbers and e-mail addresses are hashed locally before they are
//! sent; the gateway only ever sees the HMAC.

use bitflags::bitflags;
use gatebox_crypto::{PublicKey, hash_email, hash_phone};
use gatebox_proto::RecipientId;

use crate::{
    error::ClientError,
    gateway::{DirectoryEndpoint, IdQuery, KeyLookup, LookupError},
};

bitflags! {
    /// Message kinds a recipient's app can receive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ReceptionCapabilities: u8 {
        /// Text messages
        const TEXT = 1 << 0;
        /// Image messages
        const IMAGE = 1 << 1;
        /// Video messages
        const VIDEO = 1 << 2;
        /// Audio messages
        const AUDIO = 1 << 3;
        /// File messages
        const FILE = 1 << 4;
    }
}

impl ReceptionCapabilities {
    /// Parse the gateway's comma-separated list, e.g. `text,image,file`.
    ///
    /// Unknown entries are ignored so newer gateways do not break older
    /// clients.
    pub fn parse(list: &str) -> Self {
        list.split(',').map(str::trim).fold(Self::empty(), |caps, entry| {
            caps | match entry.to_ascii_lowercase().as_str() {
                "text" => Self::TEXT,
                "image" => Self::IMAGE,
                "video" => Self::VIDEO,
                "audio" => Self::AUDIO,
                "file" => Self::FILE,
                _ => Self::empty(),
            }
        })
    }
}

/// Directory client.
#[derive(Debug, Clone)]
pub struct Directory<D> {
    endpoint: D,
}

impl<D: DirectoryEndpoint + KeyLookup> Directory<D> {
    /// Create a directory client over the given endpoint.
    pub fn new(endpoint: D) -> Self {
        Self { endpoint }
    }

    /// Identity linked to a phone number (hashed before sending).
    pub async fn id_by_phone(&self, phone: &str) -> Result<RecipientId, ClientError> {
        self.id_by_phone_hash(&hash_phone(phone)).await
    }

    /// Identity linked to a precomputed phone hash.
    ///
    /// A hash that is not 64 hex characters fails with
    /// [`ErrorKind::InvalidKeyFormat`](crate::ErrorKind::InvalidKeyFormat)
    /// before anything is sent.
    pub async fn id_by_phone_hash(&self, phone_hash: &str) -> Result<RecipientId, ClientError> {
        self.lookup_id(IdQuery::PhoneHash(normalize_hash(phone_hash)?)).await
    }

    /// Identity linked to an e-mail address (hashed before sending).
    pub async fn id_by_email(&self, email: &str) -> Result<RecipientId, ClientError> {
        self.id_by_email_hash(&hash_email(email)).await
    }

    /// Identity linked to a precomputed e-mail hash.
    ///
    /// A hash that is not 64 hex characters fails with
    /// [`ErrorKind::InvalidKeyFormat`](crate::ErrorKind::InvalidKeyFormat)
    /// before anything is sent.
    pub async fn id_by_email_hash(&self, email_hash: &str) -> Result<RecipientId, ClientError> {
        self.lookup_id(IdQuery::EmailHash(normalize_hash(email_hash)?)).await
    }

    /// Public key registered for `recipient`.
    pub async fn public_key(&self, recipient: &RecipientId) -> Result<PublicKey, ClientError> {
        self.endpoint
            .lookup_public_key(recipient)
            .await
            .map_err(|e| lookup_error(e, recipient.as_str()))
    }

    /// What `recipient` can receive.
    pub async fn reception_capabilities(
        &self,
        recipient: &RecipientId,
    ) -> Result<ReceptionCapabilities, ClientError> {
        let list = self
            .endpoint
            .reception_capabilities(recipient)
            .await
            .map_err(|e| lookup_error(e, recipient.as_str()))?;

        Ok(ReceptionCapabilities::parse(&list))
    }

    /// Remaining message credits of the gateway account.
    pub async fn credits(&self) -> Result<u64, ClientError> {
        self.endpoint.credits().await.map_err(|e| match e {
            LookupError::NotFound => {
                ClientError::LookupFailed { reason: "credits unavailable".to_string() }
            },
            LookupError::Transport(reason) => ClientError::LookupFailed { reason },
        })
    }

    async fn lookup_id(&self, query: IdQuery) -> Result<RecipientId, ClientError> {
        let what = match &query {
            IdQuery::PhoneHash(hash) => format!("phone hash {hash}"),
            IdQuery::EmailHash(hash) => format!("email hash {hash}"),
        };

        let id = self.endpoint.lookup_id(query).await.map_err(|e| lookup_error(e, &what))?;
        tracing::debug!(recipient = %id, "directory lookup matched");
        Ok(id)
    }
}

fn lookup_error(err: LookupError, what: &str) -> ClientError {
    match err {
        LookupError::NotFound => ClientError::RecipientNotFound { recipient: what.to_string() },
        LookupError::Transport(reason) => ClientError::LookupFailed { reason },
    }
}

/// Hashes are 32 bytes of hex; the gateway expects lowercase.
fn normalize_hash(hash: &str) -> Result<String, ClientError> {
    let hash = hash.trim();
    if hash.len() != 64 || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ClientError::InvalidKeyFormat {
            reason: format!("directory hash must be 64 hex characters, got {hash:?}"),
        });
    }
    Ok(hash.to_ascii_lowercase())
}
