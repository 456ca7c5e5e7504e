//! Error types for the client.
//!
//! [`ClientError`] carries the structured detail of each failure,
//! [`ErrorKind`] is its flat classification, and [`SendError`] adds the
//! dispatcher stage a send failed in. Errors are returned to the caller as
//! soon as they happen; nothing is retried or swallowed.

use std::{fmt, path::PathBuf};

use gatebox_crypto::CryptoError;
use gatebox_proto::ProtocolError;
use thiserror::Error;

/// Flat classification of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Key material could not be parsed
    InvalidKeyFormat,
    /// Key cache file missing or unreadable
    KeyFileNotFound,
    /// Gateway has no such identity
    RecipientNotFound,
    /// Lookup request failed in transport
    LookupFailed,
    /// Sealing failed
    EncryptionFailed,
    /// Opening failed (tag mismatch, wrong key, truncated input, checksum)
    DecryptionFailed,
    /// Blob upload failed
    UploadFailed,
    /// Blob download failed
    DownloadFailed,
    /// Blob does not exist
    BlobNotFound,
    /// Text body over the gateway limit
    MessageTooLarge,
    /// Received payload does not decode
    MalformedPayload,
    /// Submission endpoint refused the message
    GatewayRejected,
}

/// Errors from client components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Key material could not be parsed
    #[error("invalid key format: {reason}")]
    InvalidKeyFormat {
        /// What was wrong with the key
        reason: String,
    },

    /// Key cache file could not be read
    #[error("key file {path:?} not readable: {reason}")]
    KeyFileNotFound {
        /// Path that was read
        path: PathBuf,
        /// I/O error description
        reason: String,
    },

    /// Gateway reports no such identity
    #[error("recipient not found: {recipient}")]
    RecipientNotFound {
        /// Identity or query that was looked up
        recipient: String,
    },

    /// Lookup failed in transport (not retried)
    #[error("lookup failed: {reason}")]
    LookupFailed {
        /// Transport error description
        reason: String,
    },

    /// Sealing failed
    #[error("encryption failed: {reason}")]
    EncryptionFailed {
        /// Reason reported by the cipher
        reason: String,
    },

    /// Opening failed
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// Reason for decryption failure
        reason: String,
    },

    /// Blob upload failed; no blob reference was produced
    #[error("upload failed: {reason}")]
    UploadFailed {
        /// Transport error description
        reason: String,
    },

    /// Blob download failed
    #[error("download failed: {reason}")]
    DownloadFailed {
        /// Transport error description
        reason: String,
    },

    /// Blob does not exist on the blob service
    #[error("blob not found: {blob_id}")]
    BlobNotFound {
        /// ID that was requested
        blob_id: String,
    },

    /// Text body over the gateway limit
    #[error("message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge {
        /// Body size in bytes
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Received payload does not decode
    #[error("malformed payload: {reason}")]
    MalformedPayload {
        /// Decoder error description
        reason: String,
    },

    /// Submission endpoint refused the message
    #[error("gateway rejected message ({status}): {reason}")]
    GatewayRejected {
        /// Status code reported by the gateway
        status: u16,
        /// Reason reported by the gateway
        reason: String,
    },
}

impl ClientError {
    /// Flat classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKeyFormat { .. } => ErrorKind::InvalidKeyFormat,
            Self::KeyFileNotFound { .. } => ErrorKind::KeyFileNotFound,
            Self::RecipientNotFound { .. } => ErrorKind::RecipientNotFound,
            Self::LookupFailed { .. } => ErrorKind::LookupFailed,
            Self::EncryptionFailed { .. } => ErrorKind::EncryptionFailed,
            Self::DecryptionFailed { .. } => ErrorKind::DecryptionFailed,
            Self::UploadFailed { .. } => ErrorKind::UploadFailed,
            Self::DownloadFailed { .. } => ErrorKind::DownloadFailed,
            Self::BlobNotFound { .. } => ErrorKind::BlobNotFound,
            Self::MessageTooLarge { .. } => ErrorKind::MessageTooLarge,
            Self::MalformedPayload { .. } => ErrorKind::MalformedPayload,
            Self::GatewayRejected { .. } => ErrorKind::GatewayRejected,
        }
    }

    /// Returns true if this error is transient and a caller-driven retry may
    /// succeed.
    ///
    /// Only transport failures qualify. Retrying a send after an upload
    /// failure uploads its blobs again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::LookupFailed { .. } | Self::UploadFailed { .. } | Self::DownloadFailed { .. }
        )
    }
}

impl From<CryptoError> for ClientError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidKeyFormat { reason } => Self::InvalidKeyFormat { reason },
            CryptoError::EncryptionFailed { reason } => Self::EncryptionFailed { reason },
            CryptoError::DecryptionFailed { reason } => Self::DecryptionFailed { reason },
        }
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::MessageTooLarge { size, max } => Self::MessageTooLarge { size, max },
            other => Self::MalformedPayload { reason: other.to_string() },
        }
    }
}

/// Dispatcher state in which a send failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendStage {
    /// Resolving the recipient's public key
    KeyResolution,
    /// Encoding the payload and uploading blobs
    PayloadAssembly,
    /// Sealing the payload
    Encryption,
    /// Handing the sealed payload to the gateway
    Submission,
}

impl fmt::Display for SendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KeyResolution => "key resolution",
            Self::PayloadAssembly => "payload assembly",
            Self::Encryption => "encryption",
            Self::Submission => "submission",
        };
        f.write_str(name)
    }
}

/// Failed send outcome: the stage and the originating error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("send failed during {stage}: {source}")]
pub struct SendError {
    /// Stage the send stopped in
    pub stage: SendStage,
    /// Originating error
    #[source]
    pub source: ClientError,
}

impl SendError {
    pub(crate) fn new(stage: SendStage, source: ClientError) -> Self {
        Self { stage, source }
    }

    /// Flat classification of the originating error.
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_transient() {
        assert!(ClientError::LookupFailed { reason: "timeout".to_string() }.is_transient());
        assert!(ClientError::UploadFailed { reason: "reset".to_string() }.is_transient());
        assert!(ClientError::DownloadFailed { reason: "reset".to_string() }.is_transient());
    }

    #[test]
    fn content_errors_are_not_transient() {
        assert!(!ClientError::MessageTooLarge { size: 4000, max: 3500 }.is_transient());
        let not_found = ClientError::RecipientNotFound { recipient: "ECHOECHO".to_string() };
        assert!(!not_found.is_transient());
        assert!(
            !ClientError::GatewayRejected { status: 402, reason: "no credits".to_string() }
                .is_transient()
        );
        assert!(!ClientError::DecryptionFailed { reason: "tag".to_string() }.is_transient());
    }

    #[test]
    fn protocol_errors_map_to_kinds() {
        let too_large: ClientError = ProtocolError::MessageTooLarge { size: 11, max: 10 }.into();
        assert_eq!(too_large.kind(), ErrorKind::MessageTooLarge);

        let malformed: ClientError = ProtocolError::UnknownTag(0x99).into();
        assert_eq!(malformed.kind(), ErrorKind::MalformedPayload);
    }

    #[test]
    fn crypto_errors_map_to_kinds() {
        let invalid: ClientError =
            CryptoError::InvalidKeyFormat { reason: "short".to_string() }.into();
        assert_eq!(invalid.kind(), ErrorKind::InvalidKeyFormat);

        let failed: ClientError =
            CryptoError::DecryptionFailed { reason: "tag".to_string() }.into();
        assert_eq!(failed.kind(), ErrorKind::DecryptionFailed);
    }

    #[test]
    fn send_error_names_stage() {
        let err = SendError::new(
            SendStage::PayloadAssembly,
            ClientError::UploadFailed { reason: "connection reset".to_string() },
        );

        assert_eq!(err.kind(), ErrorKind::UploadFailed);
        assert_eq!(
            err.to_string(),
            "send failed during payload assembly: upload failed: connection reset"
        );
    }
}
