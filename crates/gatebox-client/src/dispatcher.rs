//! Send orchestration.
//!
//! One [`Dispatcher::send`] runs a message through four stages:
//!
//! ```text
//! KeyResolution ──► PayloadAssembly ──► Encryption ──► Submission ──► Delivered
//! ```
//!
//! Each stage either hands its output to the next or ends the send with a
//! [`SendError`] naming the stage. A send is a single attempt.
//!
//! # Invariants
//!
//! - Nothing is submitted unless every earlier stage succeeded
//! - Every sealed payload uses a nonce drawn for it alone
//! - Per-send state lives on the stack of `send`; only an attached
//!   [`KeyCache`] outlives it

use gatebox_crypto::KeyPair;
use gatebox_proto::{BlobReference, GatewayId, PayloadLimits, RecipientId};

use crate::{
    blob_store::BlobStore,
    config::{ConfigError, DispatcherConfig},
    crypto_box::CryptoBox,
    encoder::MessageEncoder,
    env::Environment,
    error::{ClientError, SendError, SendStage},
    gateway::{Gateway, MessageId, Submission},
    key_cache::KeyCache,
    key_store::{KeySource, KeyStore, ResolvedKey},
    message::Message,
};

/// Sending gateway account: its ID and key pair.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Gateway ID messages are sent from
    pub gateway_id: GatewayId,
    /// Key pair registered for the gateway ID
    pub key_pair: KeyPair,
}

/// Successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// ID assigned by the gateway
    pub message_id: MessageId,
    /// Who the message went to
    pub recipient: RecipientId,
    /// Where the recipient key came from
    pub key_source: KeySource,
    /// Blobs uploaded for this message, in upload order
    pub blobs: Vec<BlobReference>,
}

/// Sends end-to-end encrypted messages through a gateway.
///
/// `send` takes `&self`; a dispatcher can be shared across tasks and every
/// send is independent of the others.
#[derive(Debug, Clone)]
pub struct Dispatcher<G, E> {
    identity: Identity,
    gateway: G,
    key_store: KeyStore<G>,
    key_cache: Option<KeyCache>,
    blob_store: BlobStore<G>,
    crypto: CryptoBox<E>,
    encoder: MessageEncoder,
}

impl<G: Gateway, E: Environment> Dispatcher<G, E> {
    /// Create a dispatcher with default limits and no key cache.
    pub fn new(identity: Identity, gateway: G, env: E) -> Self {
        Self {
            identity,
            key_store: KeyStore::new(gateway.clone()),
            blob_store: BlobStore::new(gateway.clone()),
            gateway,
            key_cache: None,
            crypto: CryptoBox::new(env),
            encoder: MessageEncoder::default(),
        }
    }

    /// Create a dispatcher from configuration.
    ///
    /// Attaches a key cache unless `key_cache_capacity` is zero.
    pub fn from_config(config: &DispatcherConfig, gateway: G, env: E) -> Result<Self, ConfigError> {
        let dispatcher = Self::new(config.identity()?, gateway, env).with_limits(config.limits()?);

        Ok(match config.key_cache_capacity {
            0 => dispatcher,
            capacity => dispatcher.with_key_cache(KeyCache::with_capacity(capacity)),
        })
    }

    /// Consult `cache` before resolving recipient keys.
    #[must_use]
    pub fn with_key_cache(mut self, cache: KeyCache) -> Self {
        self.key_cache = Some(cache);
        self
    }

    /// Enforce `limits` when encoding payloads.
    #[must_use]
    pub fn with_limits(mut self, limits: PayloadLimits) -> Self {
        self.encoder = MessageEncoder::new(limits);
        self
    }

    /// Sending identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Attached key cache, if any.
    pub fn key_cache(&self) -> Option<&KeyCache> {
        self.key_cache.as_ref()
    }

    /// Send one message.
    ///
    /// # Errors
    ///
    /// Returns the stage the send stopped in together with the cause. Blobs
    /// uploaded before a failure are not deleted.
    pub async fn send(&self, message: &Message) -> Result<Delivery, SendError> {
        let recipient = message.recipient;

        tracing::debug!(recipient = %recipient, stage = %SendStage::KeyResolution, "send started");
        let resolved = self
            .resolve_key(message)
            .await
            .map_err(|e| self.fail(&recipient, SendStage::KeyResolution, e))?;

        tracing::debug!(
            recipient = %recipient,
            stage = %SendStage::PayloadAssembly,
            key_source = ?resolved.source,
            "recipient key resolved"
        );
        let assembled = self
            .encoder
            .assemble(&message.body, &self.crypto, &self.blob_store)
            .await
            .map_err(|e| self.fail(&recipient, SendStage::PayloadAssembly, e))?;

        tracing::debug!(
            recipient = %recipient,
            stage = %SendStage::Encryption,
            blobs = assembled.blobs.len(),
            "payload assembled"
        );
        let payload = self
            .crypto
            .encrypt(&assembled.plaintext, self.identity.key_pair.private_key(), &resolved.key)
            .map_err(|e| self.fail(&recipient, SendStage::Encryption, e))?;

        tracing::debug!(recipient = %recipient, stage = %SendStage::Submission, "payload sealed");
        let submission = Submission { from: self.identity.gateway_id, to: recipient, payload };
        let message_id = self.gateway.submit(submission).await.map_err(|rejection| {
            self.fail(
                &recipient,
                SendStage::Submission,
                ClientError::GatewayRejected { status: rejection.status, reason: rejection.reason },
            )
        })?;

        tracing::info!(recipient = %recipient, message_id = %message_id, "message delivered");
        Ok(Delivery {
            message_id,
            recipient,
            key_source: resolved.source,
            blobs: assembled.blobs,
        })
    }

    async fn resolve_key(&self, message: &Message) -> Result<ResolvedKey, ClientError> {
        match &self.key_cache {
            Some(cache) => cache.resolve(&self.key_store, &message.recipient, &message.key).await,
            None => self.key_store.resolve_hint(&message.recipient, &message.key).await,
        }
    }

    fn fail(&self, recipient: &RecipientId, stage: SendStage, source: ClientError) -> SendError {
        tracing::warn!(
            recipient = %recipient,
            stage = %stage,
            kind = ?source.kind(),
            error = %source,
            "send failed"
        );
        SendError::new(stage, source)
    }
}
