//! Tag-prefixed plaintext payloads.
//!
//! The first byte identifies the message kind, the rest is the kind-specific
//! body. Text is raw UTF-8, images use a fixed binary layout, files use a
//! CBOR descriptor because they carry optional and variable-length metadata.
//!
//! # Invariants
//!
//! Each payload variant maps to exactly one tag (enforced by match
//! exhaustiveness). Decoding the encoding of a payload yields the same value.

mod file;
mod image;

use bytes::BufMut;
pub use file::{FilePayload, ThumbnailRef};
pub use image::ImagePayload;

use crate::errors::{ProtocolError, Result};

/// Default maximum text body size in bytes.
pub const DEFAULT_MAX_TEXT_BYTES: usize = 3500;

/// Payload kind, stored in the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageTag {
    /// UTF-8 text
    Text = 0x01,
    /// Image stored as a blob
    Image = 0x02,
    /// File stored as a blob, optionally with a thumbnail blob
    File = 0x17,
}

impl MessageTag {
    /// Tag byte.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse a tag byte. `None` for unknown tags.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Text),
            0x02 => Some(Self::Image),
            0x17 => Some(Self::File),
            _ => None,
        }
    }
}

/// Size limits enforced while encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLimits {
    /// Maximum UTF-8 text body length in bytes (inclusive)
    pub max_text_bytes: usize,
}

impl Default for PayloadLimits {
    fn default() -> Self {
        Self { max_text_bytes: DEFAULT_MAX_TEXT_BYTES }
    }
}

/// Plaintext content of one gateway message, before sealing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Text message
    Text(String),
    /// Image message referencing an uploaded blob
    Image(ImagePayload),
    /// File message referencing an uploaded blob
    File(FilePayload),
}

impl Payload {
    /// Tag corresponding to this payload type.
    pub const fn tag(&self) -> MessageTag {
        match self {
            Self::Text(_) => MessageTag::Text,
            Self::Image(_) => MessageTag::Image,
            Self::File(_) => MessageTag::File,
        }
    }

    /// Check the payload against `limits`.
    ///
    /// # Errors
    ///
    /// - `MessageTooLarge` if a text body is longer than `max_text_bytes`
    pub fn validate(&self, limits: &PayloadLimits) -> Result<()> {
        match self {
            Self::Text(body) if body.len() > limits.max_text_bytes => {
                Err(ProtocolError::MessageTooLarge {
                    size: body.len(),
                    max: limits.max_text_bytes,
                })
            },
            Self::Text(_) | Self::Image(_) | Self::File(_) => Ok(()),
        }
    }

    /// Encode tag and body into `dst`.
    ///
    /// Does NOT enforce [`PayloadLimits`]; use [`Payload::to_bytes`] on the
    /// send path.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        dst.put_u8(self.tag().to_u8());

        match self {
            Self::Text(body) => {
                dst.put_slice(body.as_bytes());
                Ok(())
            },
            Self::Image(inner) => inner.encode(dst),
            Self::File(inner) => inner.encode(dst),
        }
    }

    /// Validate against `limits`, then encode into a fresh buffer.
    pub fn to_bytes(&self, limits: &PayloadLimits) -> Result<Vec<u8>> {
        self.validate(limits)?;

        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        Ok(buf)
    }

    /// Decode a plaintext payload.
    ///
    /// # Errors
    ///
    /// - `MalformedPayload` for empty input, invalid UTF-8 or a body that
    ///   does not match its tag's layout
    /// - `UnknownTag` if the first byte is not a known tag
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (&tag, body) = bytes
            .split_first()
            .ok_or_else(|| ProtocolError::MalformedPayload("empty payload".to_string()))?;

        match MessageTag::from_u8(tag).ok_or(ProtocolError::UnknownTag(tag))? {
            MessageTag::Text => {
                let text = std::str::from_utf8(body)
                    .map_err(|e| {
                        ProtocolError::MalformedPayload(format!("text is not UTF-8: {e}"))
                    })?;
                Ok(Self::Text(text.to_string()))
            },
            MessageTag::Image => ImagePayload::decode(body).map(Self::Image),
            MessageTag::File => FilePayload::decode(body).map(Self::File),
        }
    }
}
