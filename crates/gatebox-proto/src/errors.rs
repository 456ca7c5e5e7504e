//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from parsing identifiers and encoding or decoding payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Identifier is not 8 characters of `A-Z`/`0-9` (optional leading `*`)
    #[error("invalid identity '{id}': {reason}")]
    InvalidId {
        /// The rejected input
        id: String,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Text body exceeds the gateway limit
    #[error("message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge {
        /// Encoded body size
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Payload bytes do not match the layout for their tag
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Unknown payload tag
    #[error("unknown message tag: {0:#04x}")]
    UnknownTag(u8),

    /// Blob reference with an empty ID
    #[error("blob reference has an empty id")]
    EmptyBlobId,

    /// CBOR encoding failed
    #[error("CBOR encode failed: {0}")]
    CborEncode(String),

    /// CBOR decoding failed
    #[error("CBOR decode failed: {0}")]
    CborDecode(String),
}
