//! File payload body.
//!
//! CBOR-encoded descriptor after the tag byte. Field names are embedded, so
//! recipients can ignore fields they do not know.

use bytes::BufMut;
use gatebox_crypto::{BLOB_KEY_SIZE, BlobKey, CHECKSUM_SIZE};
use serde::{Deserialize, Serialize};

use crate::{
    BlobReference,
    errors::{ProtocolError, Result},
};

/// Flag bit set when a thumbnail is attached.
const FLAG_THUMBNAIL: u8 = 0b0000_0001;

/// File stored out-of-band as an encrypted blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    /// Uploaded encrypted file
    pub blob: BlobReference,
    /// Key the file blob is encrypted with
    pub key: BlobKey,
    /// MIME type, e.g. `application/zip`
    pub mime_type: String,
    /// File name shown to the recipient
    pub filename: String,
    /// Plaintext file size in bytes
    pub size: u64,
    /// Truncated SHA-256 of the plaintext file
    pub checksum: [u8; CHECKSUM_SIZE],
    /// Optional thumbnail blob
    pub thumbnail: Option<ThumbnailRef>,
}

/// Thumbnail blob attached to a file message. Encrypted under its own key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRef {
    /// Uploaded encrypted thumbnail
    pub blob: BlobReference,
    /// Key the thumbnail blob is encrypted with
    pub key: BlobKey,
    /// Truncated SHA-256 of the plaintext thumbnail
    pub checksum: [u8; CHECKSUM_SIZE],
}

#[derive(Serialize, Deserialize)]
struct FileDescriptor {
    flags: u8,
    blob_id: String,
    blob_size: u64,
    key: [u8; BLOB_KEY_SIZE],
    mime_type: String,
    filename: String,
    size: u64,
    checksum: [u8; CHECKSUM_SIZE],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumbnail: Option<ThumbnailDescriptor>,
}

#[derive(Serialize, Deserialize)]
struct ThumbnailDescriptor {
    blob_id: String,
    blob_size: u64,
    key: [u8; BLOB_KEY_SIZE],
    checksum: [u8; CHECKSUM_SIZE],
}

impl FilePayload {
    /// Whether a thumbnail is attached.
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }

    pub(crate) fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        let descriptor = FileDescriptor {
            flags: if self.has_thumbnail() { FLAG_THUMBNAIL } else { 0 },
            blob_id: self.blob.id().to_string(),
            blob_size: self.blob.size(),
            key: *self.key.as_bytes(),
            mime_type: self.mime_type.clone(),
            filename: self.filename.clone(),
            size: self.size,
            checksum: self.checksum,
            thumbnail: self.thumbnail.as_ref().map(|thumb| ThumbnailDescriptor {
                blob_id: thumb.blob.id().to_string(),
                blob_size: thumb.blob.size(),
                key: *thumb.key.as_bytes(),
                checksum: thumb.checksum,
            }),
        };

        ciborium::ser::into_writer(&descriptor, dst.writer())
            .map_err(|e| ProtocolError::CborEncode(e.to_string()))
    }

    pub(crate) fn decode(body: &[u8]) -> Result<Self> {
        let descriptor: FileDescriptor =
            ciborium::de::from_reader(body).map_err(|e| ProtocolError::CborDecode(e.to_string()))?;

        let flagged = descriptor.flags & FLAG_THUMBNAIL != 0;
        if flagged != descriptor.thumbnail.is_some() {
            return Err(ProtocolError::MalformedPayload(
                "thumbnail flag does not match thumbnail presence".to_string(),
            ));
        }

        let thumbnail = descriptor
            .thumbnail
            .map(|thumb| -> Result<ThumbnailRef> {
                Ok(ThumbnailRef {
                    blob: BlobReference::new(thumb.blob_id, thumb.blob_size)?,
                    key: BlobKey::from_bytes(thumb.key),
                    checksum: thumb.checksum,
                })
            })
            .transpose()?;

        Ok(Self {
            blob: BlobReference::new(descriptor.blob_id, descriptor.blob_size)?,
            key: BlobKey::from_bytes(descriptor.key),
            mime_type: descriptor.mime_type,
            filename: descriptor.filename,
            size: descriptor.size,
            checksum: descriptor.checksum,
            thumbnail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MessageTag, Payload};

    fn sample(thumbnail: bool) -> FilePayload {
        FilePayload {
            blob: BlobReference::new("file-blob", 2_048).unwrap(),
            key: BlobKey::from_bytes([0x01; BLOB_KEY_SIZE]),
            mime_type: "application/zip".to_string(),
            filename: "some_file.zip".to_string(),
            size: 2_032,
            checksum: [0x02; CHECKSUM_SIZE],
            thumbnail: thumbnail.then(|| ThumbnailRef {
                blob: BlobReference::new("thumb-blob", 316).unwrap(),
                key: BlobKey::from_bytes([0x03; BLOB_KEY_SIZE]),
                checksum: [0x04; CHECKSUM_SIZE],
            }),
        }
    }

    #[test]
    fn file_roundtrip_without_thumbnail() {
        let mut buf = Vec::new();
        Payload::File(sample(false)).encode(&mut buf).unwrap();

        assert_eq!(buf[0], MessageTag::File.to_u8());
        assert_eq!(Payload::decode(&buf).unwrap(), Payload::File(sample(false)));
    }

    #[test]
    fn file_roundtrip_with_thumbnail() {
        let mut buf = Vec::new();
        Payload::File(sample(true)).encode(&mut buf).unwrap();

        let decoded = Payload::decode(&buf).unwrap();
        let Payload::File(file) = decoded else {
            unreachable!("expected a file payload");
        };
        assert!(file.has_thumbnail());
        assert_eq!(file, sample(true));
    }

    #[test]
    fn flag_mismatch_is_rejected() {
        let descriptor = FileDescriptor {
            flags: FLAG_THUMBNAIL,
            blob_id: "file-blob".to_string(),
            blob_size: 10,
            key: [0; BLOB_KEY_SIZE],
            mime_type: "text/plain".to_string(),
            filename: "a.txt".to_string(),
            size: 1,
            checksum: [0; CHECKSUM_SIZE],
            thumbnail: None,
        };
        let mut buf = vec![MessageTag::File.to_u8()];
        ciborium::ser::into_writer(&descriptor, &mut buf).unwrap();

        assert!(matches!(Payload::decode(&buf), Err(ProtocolError::MalformedPayload(_))));
    }

    #[test]
    fn garbage_body_is_rejected() {
        let result = Payload::decode(&[MessageTag::File.to_u8(), 0xFF, 0x00]);
        assert!(matches!(result, Err(ProtocolError::CborDecode(_))));
    }
}
