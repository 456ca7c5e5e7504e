//! Plaintext payload assembly.
//!
//! Text bodies are encoded directly. Image and file bodies go through
//! generate key → encrypt blob → upload → assemble, one blob at a time: the
//! file first, then its thumbnail. The first failure aborts assembly; blobs
//! uploaded before it stay on the blob service unreferenced.

use bytes::Bytes;
use gatebox_crypto::BlobKind;
use gatebox_proto::{
    BlobReference, Payload, PayloadLimits,
    payload::{FilePayload, ImagePayload, ThumbnailRef},
};

use crate::{
    blob_store::BlobStore, crypto_box::CryptoBox, env::Environment, error::ClientError,
    gateway::BlobEndpoint, message::MessageBody,
};

/// Encoded plaintext ready for sealing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPayload {
    /// Tag byte followed by the kind-specific body
    pub plaintext: Vec<u8>,
    /// Blobs uploaded while assembling, in upload order
    pub blobs: Vec<BlobReference>,
}

/// Builds plaintext payloads from message bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageEncoder {
    limits: PayloadLimits,
}

impl MessageEncoder {
    /// Create an encoder enforcing `limits`.
    pub fn new(limits: PayloadLimits) -> Self {
        Self { limits }
    }

    /// Limits this encoder enforces.
    pub fn limits(&self) -> PayloadLimits {
        self.limits
    }

    /// Encode a payload whose blobs (if any) are already uploaded.
    ///
    /// # Errors
    ///
    /// - `MessageTooLarge`: text body over `max_text_bytes`
    pub fn encode(&self, payload: &Payload) -> Result<Vec<u8>, ClientError> {
        Ok(payload.to_bytes(&self.limits)?)
    }

    /// Decode a received plaintext payload.
    ///
    /// # Errors
    ///
    /// - `MalformedPayload`: unknown tag, bad length, invalid UTF-8 or CBOR
    pub fn decode(plaintext: &[u8]) -> Result<Payload, ClientError> {
        Ok(Payload::decode(plaintext)?)
    }

    /// Turn `body` into a plaintext payload, uploading its blobs.
    ///
    /// Text is checked against the limits before anything else happens.
    ///
    /// # Errors
    ///
    /// - `MessageTooLarge`: text body over `max_text_bytes`
    /// - `UploadFailed`: a blob upload failed; assembly stops there
    pub async fn assemble<E, B>(
        &self,
        body: &MessageBody,
        crypto: &CryptoBox<E>,
        store: &BlobStore<B>,
    ) -> Result<AssembledPayload, ClientError>
    where
        E: Environment,
        B: BlobEndpoint,
    {
        match body {
            MessageBody::Text { body } => {
                let plaintext = self.encode(&Payload::Text(body.clone()))?;
                Ok(AssembledPayload { plaintext, blobs: Vec::new() })
            },
            MessageBody::Image { image_bytes } => {
                let sealed = crypto.derive_and_encrypt(image_bytes, BlobKind::Image)?;
                let blob = store.upload(Bytes::from(sealed.ciphertext)).await?;

                let payload = Payload::Image(ImagePayload {
                    blob: blob.clone(),
                    key: sealed.key,
                    checksum: sealed.checksum,
                });
                Ok(AssembledPayload { plaintext: self.encode(&payload)?, blobs: vec![blob] })
            },
            MessageBody::File { file_bytes, thumbnail_bytes, mime_type, filename } => {
                let sealed = crypto.derive_and_encrypt(file_bytes, BlobKind::File)?;
                let file_blob = store.upload(Bytes::from(sealed.ciphertext)).await?;
                let mut blobs = vec![file_blob.clone()];

                let thumbnail = match thumbnail_bytes {
                    Some(thumb_bytes) => {
                        let thumb = crypto.derive_and_encrypt(thumb_bytes, BlobKind::Thumbnail)?;
                        let thumb_blob = store.upload(Bytes::from(thumb.ciphertext)).await?;
                        blobs.push(thumb_blob.clone());

                        Some(ThumbnailRef {
                            blob: thumb_blob,
                            key: thumb.key,
                            checksum: thumb.checksum,
                        })
                    },
                    None => None,
                };

                let payload = Payload::File(FilePayload {
                    blob: file_blob,
                    key: sealed.key,
                    mime_type: mime_type.clone(),
                    filename: filename.clone(),
                    size: sealed.plaintext_len as u64,
                    checksum: sealed.checksum,
                    thumbnail,
                });
                Ok(AssembledPayload { plaintext: self.encode(&payload)?, blobs })
            },
        }
    }
}
