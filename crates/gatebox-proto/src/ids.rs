//! Gateway identities.
//!
//! Every identity is exactly eight characters of uppercase ASCII letters and
//! digits. Gateway identities (the senders) additionally start with `*`, and
//! since a gateway identity can receive messages too, a leading `*` is also
//! accepted for recipients.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, Result};

/// Length of every identity in characters.
pub const ID_LENGTH: usize = 8;

/// Identity of a message recipient.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipientId([u8; ID_LENGTH]);

impl RecipientId {
    /// Parse and validate an identity.
    pub fn new(id: &str) -> Result<Self> {
        parse_id(id).map(Self)
    }

    /// Identity as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII bytes pass validation
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// True for gateway (`*`-prefixed) identities.
    pub fn is_gateway(&self) -> bool {
        self.0[0] == b'*'
    }
}

/// Identity of the sending gateway account (`*` followed by seven
/// characters).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GatewayId(RecipientId);

impl GatewayId {
    /// Parse and validate a gateway identity.
    pub fn new(id: &str) -> Result<Self> {
        let inner = RecipientId::new(id)?;
        if !inner.is_gateway() {
            return Err(ProtocolError::InvalidId {
                id: id.to_string(),
                reason: "gateway identities start with '*'",
            });
        }
        Ok(Self(inner))
    }

    /// Identity as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The same identity in recipient form.
    pub fn as_recipient(&self) -> RecipientId {
        self.0
    }
}

fn parse_id(id: &str) -> Result<[u8; ID_LENGTH]> {
    let bytes: [u8; ID_LENGTH] = id.as_bytes().try_into().map_err(|_| ProtocolError::InvalidId {
        id: id.to_string(),
        reason: "identities are exactly 8 characters",
    })?;

    for (i, &b) in bytes.iter().enumerate() {
        let valid = b.is_ascii_uppercase() || b.is_ascii_digit() || (i == 0 && b == b'*');
        if !valid {
            return Err(ProtocolError::InvalidId {
                id: id.to_string(),
                reason: "only A-Z, 0-9 and a leading '*' are allowed",
            });
        }
    }

    Ok(bytes)
}

impl fmt::Debug for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecipientId({})", self.as_str())
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipientId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for RecipientId {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<RecipientId> for String {
    fn from(id: RecipientId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Debug for GatewayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GatewayId({})", self.as_str())
    }
}

impl fmt::Display for GatewayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatewayId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for GatewayId {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<GatewayId> for String {
    fn from(id: GatewayId) -> Self {
        id.as_str().to_string()
    }
}
