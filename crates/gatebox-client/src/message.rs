//! Outgoing messages.

use std::path::PathBuf;

use bytes::Bytes;
use gatebox_proto::RecipientId;

use crate::key_store::KeyHint;

/// One message to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Recipient identity
    pub recipient: RecipientId,
    /// Where the recipient's public key comes from
    pub key: KeyHint,
    /// Content
    pub body: MessageBody,
}

/// Content of an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// UTF-8 text
    Text {
        /// Message text
        body: String,
    },
    /// Image, uploaded as an encrypted blob
    Image {
        /// Raw image bytes
        image_bytes: Bytes,
    },
    /// File, uploaded as an encrypted blob with an optional thumbnail
    File {
        /// Raw file bytes
        file_bytes: Bytes,
        /// Raw thumbnail bytes
        thumbnail_bytes: Option<Bytes>,
        /// MIME type, e.g. `application/zip`
        mime_type: String,
        /// File name shown to the recipient
        filename: String,
    },
}

impl Message {
    /// Text message whose key is looked up at the gateway.
    pub fn text(recipient: RecipientId, body: impl Into<String>) -> Self {
        Self { recipient, key: KeyHint::Lookup, body: MessageBody::Text { body: body.into() } }
    }

    /// Image message whose key is looked up at the gateway.
    pub fn image(recipient: RecipientId, image_bytes: impl Into<Bytes>) -> Self {
        Self {
            recipient,
            key: KeyHint::Lookup,
            body: MessageBody::Image { image_bytes: image_bytes.into() },
        }
    }

    /// File message without a thumbnail whose key is looked up at the
    /// gateway.
    pub fn file(
        recipient: RecipientId,
        file_bytes: impl Into<Bytes>,
        mime_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            key: KeyHint::Lookup,
            body: MessageBody::File {
                file_bytes: file_bytes.into(),
                thumbnail_bytes: None,
                mime_type: mime_type.into(),
                filename: filename.into(),
            },
        }
    }

    /// Attach a thumbnail. No effect on text and image messages.
    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<Bytes>) -> Self {
        if let MessageBody::File { thumbnail_bytes, .. } = &mut self.body {
            *thumbnail_bytes = Some(thumbnail.into());
        }
        self
    }

    /// Use an explicitly supplied public key (`public:<hex>` or 64 hex).
    #[must_use]
    pub fn with_public_key(mut self, encoded: impl Into<String>) -> Self {
        self.key = KeyHint::Explicit(encoded.into());
        self
    }

    /// Read the public key from a key cache file.
    #[must_use]
    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key = KeyHint::CacheFile(path.into());
        self
    }
}
