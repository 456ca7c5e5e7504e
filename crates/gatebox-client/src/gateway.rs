//! Gateway capabilities this crate depends on.
//!
//! Implemented by the HTTP transport (outside this crate) and by the
//! in-memory gateway used in tests. Implementations are cheap to clone and
//! share their connection state, the same way storage backends share theirs
//! through an `Arc`.
//!
//! Futures returned here are the only suspension points of a send. Retry
//! policy, connection pooling and TLS belong to the implementation.

use std::{fmt, future::Future};

use bytes::Bytes;
use gatebox_crypto::PublicKey;
use gatebox_proto::{EncryptedPayload, GatewayId, RecipientId};
use thiserror::Error;

/// Failure of a directory or public-key lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The gateway has no entry for the query
    #[error("not found")]
    NotFound,
    /// Request could not be completed
    #[error("transport error: {0}")]
    Transport(String),
}

/// Failure of a blob upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Failure of a blob download.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    /// No blob with this ID exists (never uploaded or already expired)
    #[error("blob not found")]
    NotFound,
    /// Request could not be completed
    #[error("transport error: {0}")]
    Transport(String),
}

/// Non-success answer of the message submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("gateway rejected message ({status}): {reason}")]
pub struct Rejection {
    /// Status code reported by the gateway
    pub status: u16,
    /// Reason reported by the gateway
    pub reason: String,
}

/// Gateway-assigned ID of a submitted message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap the ID returned by the gateway.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One sealed message handed to the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Sending gateway identity
    pub from: GatewayId,
    /// Recipient identity
    pub to: RecipientId,
    /// Nonce and box ciphertext
    pub payload: EncryptedPayload,
}

/// Hashed directory query. Raw phone numbers and addresses never leave the
/// process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdQuery {
    /// HMAC-SHA256 of a phone number, lowercase hex
    PhoneHash(String),
    /// HMAC-SHA256 of an e-mail address, lowercase hex
    EmailHash(String),
}

/// Gateway public-key endpoint.
pub trait KeyLookup: Clone + Send + Sync + 'static {
    /// Fetch the public key registered for `recipient`.
    ///
    /// Returns [`LookupError::NotFound`] if the ID does not exist.
    fn lookup_public_key(
        &self,
        recipient: &RecipientId,
    ) -> impl Future<Output = Result<PublicKey, LookupError>> + Send;
}

/// Gateway blob endpoint.
pub trait BlobEndpoint: Clone + Send + Sync + 'static {
    /// Upload an encrypted blob and return the ID the service assigned.
    ///
    /// # Invariants
    ///
    /// - All-or-nothing: an `Err` means no blob ID was assigned
    fn upload_blob(&self, blob: Bytes)
    -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Download an encrypted blob by ID.
    fn download_blob(&self, id: &str) -> impl Future<Output = Result<Bytes, DownloadError>> + Send;
}

/// Gateway message submission endpoint.
pub trait SubmitEndpoint: Clone + Send + Sync + 'static {
    /// Submit one sealed message.
    fn submit(
        &self,
        submission: Submission,
    ) -> impl Future<Output = Result<MessageId, Rejection>> + Send;
}

/// Gateway directory endpoint.
pub trait DirectoryEndpoint: Clone + Send + Sync + 'static {
    /// Find the identity linked to a hashed phone number or e-mail address.
    fn lookup_id(
        &self,
        query: IdQuery,
    ) -> impl Future<Output = Result<RecipientId, LookupError>> + Send;

    /// Comma-separated capability list of `recipient`, e.g. `text,image,file`.
    fn reception_capabilities(
        &self,
        recipient: &RecipientId,
    ) -> impl Future<Output = Result<String, LookupError>> + Send;

    /// Remaining message credits of the gateway account.
    fn credits(&self) -> impl Future<Output = Result<u64, LookupError>> + Send;
}

/// Everything a [`Dispatcher`](crate::Dispatcher) needs from the gateway.
pub trait Gateway: KeyLookup + BlobEndpoint + SubmitEndpoint {}

impl<T: KeyLookup + BlobEndpoint + SubmitEndpoint> Gateway for T {}
