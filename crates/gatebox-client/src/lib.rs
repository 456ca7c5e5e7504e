//! Gateway Client
//!
//! Sends end-to-end encrypted text, image and file messages through a
//! messaging gateway. The gateway relays ciphertext and stores encrypted
//! blobs; it never sees plaintext or blob keys.
//!
//! # Architecture
//!
//! All network access goes through capability traits in [`gateway`]
//! (public-key lookup, blob upload/download, message submission, directory).
//! The HTTP transport implementing them lives outside this crate. Randomness
//! comes from an injected [`Environment`] so sends are reproducible in tests.
//!
//! # Components
//!
//! - [`KeyStore`]: resolves a recipient's public key from an explicit value, a
//!   key cache file or a remote lookup
//! - [`KeyCache`]: optional in-memory layer above the key store
//! - [`CryptoBox`]: message box and blob encryption with fresh randomness
//! - [`BlobStore`]: upload/download of encrypted attachments
//! - [`MessageEncoder`]: builds the plaintext payload, uploading blobs first
//! - [`Dispatcher`]: runs one send through key resolution, payload assembly,
//!   encryption and submission
//! - [`Receiver`]: opens incoming payloads and fetches their blobs
//! - [`Directory`]: identity and capability lookups
//!
//! # Send Flow
//!
//! ```text
//! KeyResolution ──► PayloadAssembly ──► Encryption ──► Submission ──► Delivered
//!       │                  │                 │              │
//!       └──────────────────┴─────────────────┴──────────────┴──► Failed(stage, kind)
//! ```
//!
//! Nothing retries. A failed send never yields a partial result; blobs
//! uploaded before a later failure stay orphaned on the blob service.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod blob_store;
mod config;
mod crypto_box;
mod directory;
mod dispatcher;
mod encoder;
mod env;
mod error;
pub mod gateway;
mod key_cache;
mod key_store;
mod message;
mod receiver;

pub use blob_store::BlobStore;
pub use config::{ConfigError, DEFAULT_KEY_CACHE_CAPACITY, DispatcherConfig};
pub use crypto_box::CryptoBox;
pub use directory::{Directory, ReceptionCapabilities};
pub use dispatcher::{Delivery, Dispatcher, Identity};
pub use encoder::{AssembledPayload, MessageEncoder};
pub use env::{Environment, SystemEnv};
pub use error::{ClientError, ErrorKind, SendError, SendStage};
pub use gatebox_crypto::{BlobKind, KeyPair, PrivateKey, PublicKey};
pub use gatebox_proto::{
    BlobReference, EncryptedPayload, GatewayId, Payload, PayloadLimits, RecipientId,
};
pub use gateway::{Gateway, MessageId};
pub use key_cache::KeyCache;
pub use key_store::{KeyHint, KeySource, KeyStore, ResolvedKey};
pub use message::{Message, MessageBody};
pub use receiver::Receiver;
