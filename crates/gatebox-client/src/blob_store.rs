//! Upload and download of encrypted blobs.

use bytes::Bytes;
use gatebox_proto::BlobReference;

use crate::{
    error::ClientError,
    gateway::{BlobEndpoint, DownloadError},
};

/// Blob service client. Moves ciphertext only; encryption happens before
/// upload and after download.
#[derive(Debug, Clone)]
pub struct BlobStore<B> {
    endpoint: B,
}

impl<B: BlobEndpoint> BlobStore<B> {
    /// Create a blob store over the given endpoint.
    pub fn new(endpoint: B) -> Self {
        Self { endpoint }
    }

    /// Upload one encrypted blob.
    ///
    /// All-or-nothing: on error no reference exists.
    ///
    /// # Errors
    ///
    /// - `UploadFailed`: transport failure, or the service returned an empty
    ///   blob ID
    pub async fn upload(&self, encrypted: Bytes) -> Result<BlobReference, ClientError> {
        let size = encrypted.len() as u64;

        let id = self
            .endpoint
            .upload_blob(encrypted)
            .await
            .map_err(|e| ClientError::UploadFailed { reason: e.0 })?;

        let blob = BlobReference::new(id, size).map_err(|_| ClientError::UploadFailed {
            reason: "blob service returned an empty blob id".to_string(),
        })?;

        tracing::debug!(blob_id = blob.id(), size, "uploaded blob");
        Ok(blob)
    }

    /// Download one encrypted blob.
    ///
    /// # Errors
    ///
    /// - `BlobNotFound`: no blob with this ID exists
    /// - `DownloadFailed`: transport failure, or the blob's length differs
    ///   from the reference
    pub async fn download(&self, blob: &BlobReference) -> Result<Bytes, ClientError> {
        let bytes = self.endpoint.download_blob(blob.id()).await.map_err(|e| match e {
            DownloadError::NotFound => ClientError::BlobNotFound { blob_id: blob.id().to_string() },
            DownloadError::Transport(reason) => ClientError::DownloadFailed { reason },
        })?;

        if bytes.len() as u64 != blob.size() {
            return Err(ClientError::DownloadFailed {
                reason: format!(
                    "blob {} is {} bytes, expected {}",
                    blob.id(),
                    bytes.len(),
                    blob.size()
                ),
            });
        }

        tracing::debug!(blob_id = blob.id(), size = bytes.len(), "downloaded blob");
        Ok(bytes)
    }
}
