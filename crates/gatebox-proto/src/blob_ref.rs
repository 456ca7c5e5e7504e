use crate::errors::{ProtocolError, Result};

/// Reference to an uploaded (encrypted) blob.
///
/// The ID is assigned by the blob service and is opaque; the only check is
/// that it is non-empty. `size` is the encrypted blob length in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobReference {
    id: String,
    size: u64,
}

impl BlobReference {
    /// Create a reference. Fails on an empty ID.
    pub fn new(id: impl Into<String>, size: u64) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ProtocolError::EmptyBlobId);
        }
        Ok(Self { id, size })
    }

    /// Blob ID as assigned by the blob service.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Encrypted blob size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_rejected() {
        assert_eq!(BlobReference::new("", 10), Err(ProtocolError::EmptyBlobId));
    }

    #[test]
    fn id_is_not_interpreted() {
        let blob = BlobReference::new("not-hex but fine", 42).unwrap();
        assert_eq!(blob.id(), "not-hex but fine");
        assert_eq!(blob.size(), 42);
    }
}
