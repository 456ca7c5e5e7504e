//! Gatebox wire format
//!
//! Identifiers, blob references and the plaintext payload layout that is
//! sealed inside every gateway message.
//!
//! # Payload Layout
//!
//! ```text
//! ┌──────┬──────────────────────────────┐
//! │ tag  │ kind-specific body           │
//! │ u8   │                              │
//! └──────┴──────────────────────────────┘
//!  0x01   UTF-8 text
//!  0x02   blob id, blob size, blob key, checksum (fixed binary)
//!  0x17   CBOR file descriptor
//! ```
//!
//! The sealed form on the wire is `nonce (24 bytes) || box ciphertext`
//! ([`EncryptedPayload`]).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod blob_ref;
mod envelope;
pub mod errors;
mod ids;
pub mod payload;

pub use blob_ref::BlobReference;
pub use envelope::EncryptedPayload;
pub use errors::{ProtocolError, Result};
pub use ids::{GatewayId, ID_LENGTH, RecipientId};
pub use payload::{
    DEFAULT_MAX_TEXT_BYTES, FilePayload, ImagePayload, MessageTag, Payload, PayloadLimits,
    ThumbnailRef,
};
