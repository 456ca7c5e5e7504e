//! Image payload body.
//!
//! Fixed binary layout after the tag byte:
//!
//! ```text
//! id_len:u8 | blob_id[id_len] | blob_size:u32 LE | key[32] | checksum[16]
//! ```

use bytes::{Buf, BufMut};
use gatebox_crypto::{BLOB_KEY_SIZE, BlobKey, CHECKSUM_SIZE};

use crate::{
    BlobReference,
    errors::{ProtocolError, Result},
};

/// Image stored out-of-band as an encrypted blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Uploaded encrypted image
    pub blob: BlobReference,
    /// Key the image blob is encrypted with
    pub key: BlobKey,
    /// Truncated SHA-256 of the plaintext image
    pub checksum: [u8; CHECKSUM_SIZE],
}

impl ImagePayload {
    pub(crate) fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        let id = self.blob.id().as_bytes();
        let id_len = u8::try_from(id.len()).map_err(|_| {
            ProtocolError::MalformedPayload(format!("blob id is {} bytes, max 255", id.len()))
        })?;
        let size = u32::try_from(self.blob.size()).map_err(|_| {
            ProtocolError::MalformedPayload(format!("image blob of {} bytes", self.blob.size()))
        })?;

        dst.put_u8(id_len);
        dst.put_slice(id);
        dst.put_u32_le(size);
        dst.put_slice(self.key.as_bytes());
        dst.put_slice(&self.checksum);
        Ok(())
    }

    pub(crate) fn decode(mut body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Err(truncated("blob id length"));
        }
        let id_len = body.get_u8() as usize;

        if body.len() != id_len + 4 + BLOB_KEY_SIZE + CHECKSUM_SIZE {
            return Err(ProtocolError::MalformedPayload(format!(
                "image body has {} bytes after id length, expected {}",
                body.len(),
                id_len + 4 + BLOB_KEY_SIZE + CHECKSUM_SIZE
            )));
        }

        let id = std::str::from_utf8(&body[..id_len])
            .map_err(|e| ProtocolError::MalformedPayload(format!("blob id is not UTF-8: {e}")))?
            .to_string();
        body.advance(id_len);

        let size = body.get_u32_le();

        let mut key = [0u8; BLOB_KEY_SIZE];
        body.copy_to_slice(&mut key);

        let mut checksum = [0u8; CHECKSUM_SIZE];
        body.copy_to_slice(&mut checksum);

        Ok(Self {
            blob: BlobReference::new(id, u64::from(size))?,
            key: BlobKey::from_bytes(key),
            checksum,
        })
    }
}

fn truncated(field: &str) -> ProtocolError {
    ProtocolError::MalformedPayload(format!("image body truncated at {field}"))
}
