//! Recipient side: opening incoming payloads and fetching their blobs.

use bytes::Bytes;
use gatebox_crypto::{BlobKey, BlobKind, CHECKSUM_SIZE, KeyPair, PublicKey};
use gatebox_proto::{
    BlobReference, EncryptedPayload, Payload,
    payload::{FilePayload, ImagePayload},
};

use crate::{blob_store::BlobStore, error::ClientError, gateway::BlobEndpoint};

/// Opens messages addressed to a key pair.
#[derive(Debug, Clone)]
pub struct Receiver<B> {
    key_pair: KeyPair,
    blob_store: BlobStore<B>,
}

impl<B: BlobEndpoint> Receiver<B> {
    /// Create a receiver for messages sealed to `key_pair`.
    pub fn new(key_pair: KeyPair, endpoint: B) -> Self {
        Self { key_pair, blob_store: BlobStore::new(endpoint) }
    }

    /// Open and decode a payload sealed by `sender`.
    ///
    /// # Errors
    ///
    /// - `DecryptionFailed`: wrong keys, modified or truncated ciphertext
    /// - `MalformedPayload`: plaintext is not a valid payload
    pub fn open(
        &self,
        sender: &PublicKey,
        payload: &EncryptedPayload,
    ) -> Result<Payload, ClientError> {
        let plaintext = gatebox_crypto::open(
            payload.ciphertext(),
            payload.nonce(),
            sender,
            self.key_pair.private_key(),
        )?;

        Ok(Payload::decode(&plaintext)?)
    }

    /// Download, decrypt and verify one blob.
    ///
    /// # Errors
    ///
    /// - `BlobNotFound` / `DownloadFailed`: see [`BlobStore::download`]
    /// - `DecryptionFailed`: wrong key or kind, modified blob, or a checksum
    ///   mismatch
    pub async fn fetch_blob(
        &self,
        blob: &BlobReference,
        key: &BlobKey,
        kind: BlobKind,
        checksum: &[u8; CHECKSUM_SIZE],
    ) -> Result<Bytes, ClientError> {
        let encrypted = self.blob_store.download(blob).await?;
        let plaintext = gatebox_crypto::decrypt_blob(&encrypted, key, kind)?;

        if gatebox_crypto::checksum(&plaintext) != *checksum {
            return Err(ClientError::DecryptionFailed {
                reason: format!("checksum mismatch for blob {}", blob.id()),
            });
        }

        Ok(Bytes::from(plaintext))
    }

    /// Fetch the image an image payload refers to.
    pub async fn fetch_image(&self, image: &ImagePayload) -> Result<Bytes, ClientError> {
        self.fetch_blob(&image.blob, &image.key, BlobKind::Image, &image.checksum).await
    }

    /// Fetch the file a file payload refers to.
    ///
    /// # Errors
    ///
    /// As [`Receiver::fetch_blob`], plus `MalformedPayload` if the decrypted
    /// file's length differs from the size in the payload.
    pub async fn fetch_file(&self, file: &FilePayload) -> Result<Bytes, ClientError> {
        let bytes = self.fetch_blob(&file.blob, &file.key, BlobKind::File, &file.checksum).await?;

        if bytes.len() as u64 != file.size {
            return Err(ClientError::MalformedPayload {
                reason: format!("file is {} bytes, payload says {}", bytes.len(), file.size),
            });
        }
        Ok(bytes)
    }

    /// Fetch the thumbnail of a file payload, if it has one.
    pub async fn fetch_thumbnail(&self, file: &FilePayload) -> Result<Option<Bytes>, ClientError> {
        let Some(thumb) = &file.thumbnail else {
            return Ok(None);
        };

        self.fetch_blob(&thumb.blob, &thumb.key, BlobKind::Thumbnail, &thumb.checksum)
            .await
            .map(Some)
    }
}
