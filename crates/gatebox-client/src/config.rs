//! Dispatcher configuration.
//!
//! Deserialized by the caller from whatever source it uses (file,
//! environment); this crate only defines the shape and validates it.

use std::fmt;

use gatebox_crypto::{KeyPair, PrivateKey};
use gatebox_proto::{DEFAULT_MAX_TEXT_BYTES, GatewayId, PayloadLimits};
use serde::Deserialize;
use thiserror::Error;

use crate::dispatcher::Identity;

/// Default number of recipient keys kept in memory.
pub const DEFAULT_KEY_CACHE_CAPACITY: usize = 1000;

/// Invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `private_key` is not `private:<64 hex>`
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
    /// `max_text_bytes` is zero
    #[error("max_text_bytes must be greater than zero")]
    ZeroTextLimit,
}

/// Dispatcher configuration
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Sending gateway identity, e.g. `*YOUR123`
    pub gateway_id: GatewayId,
    /// Gateway private key as `private:<hex>`
    pub private_key: String,
    /// Maximum text body length in bytes
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,
    /// Recipient keys kept in memory (0 disables the cache)
    #[serde(default = "default_key_cache_capacity")]
    pub key_cache_capacity: usize,
}

fn default_max_text_bytes() -> usize {
    DEFAULT_MAX_TEXT_BYTES
}

fn default_key_cache_capacity() -> usize {
    DEFAULT_KEY_CACHE_CAPACITY
}

impl DispatcherConfig {
    /// Configuration with default limits.
    pub fn new(gateway_id: GatewayId, private_key: impl Into<String>) -> Self {
        Self {
            gateway_id,
            private_key: private_key.into(),
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
            key_cache_capacity: DEFAULT_KEY_CACHE_CAPACITY,
        }
    }

    /// Validate the key material and build the sender identity.
    pub fn identity(&self) -> Result<Identity, ConfigError> {
        let private = PrivateKey::decode(&self.private_key)
            .map_err(|e| ConfigError::InvalidPrivateKey(e.to_string()))?;

        Ok(Identity { gateway_id: self.gateway_id, key_pair: KeyPair::from_private(private) })
    }

    /// Payload limits described by this configuration.
    pub fn limits(&self) -> Result<PayloadLimits, ConfigError> {
        if self.max_text_bytes == 0 {
            return Err(ConfigError::ZeroTextLimit);
        }
        Ok(PayloadLimits { max_text_bytes: self.max_text_bytes })
    }
}

impl fmt::Debug for DispatcherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherConfig")
            .field("gateway_id", &self.gateway_id)
            .field("private_key", &"..")
            .field("max_text_bytes", &self.max_text_bytes)
            .field("key_cache_capacity", &self.key_cache_capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE: &str =
        "private:77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a";

    #[test]
    fn defaults_apply() {
        let json = format!(r#"{{"gateway_id": "*GATEWAY", "private_key": "{PRIVATE}"}}"#);
        let config: DispatcherConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.gateway_id.as_str(), "*GATEWAY");
        assert_eq!(config.max_text_bytes, 3500);
        assert_eq!(config.key_cache_capacity, 1000);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = format!(
            r#"{{"gateway_id": "*GATEWAY", "private_key": "{PRIVATE}", "retries": 3}}"#
        );
        assert!(serde_json::from_str::<DispatcherConfig>(&json).is_err());
    }

    #[test]
    fn non_gateway_id_is_rejected() {
        let json = format!(r#"{{"gateway_id": "ECHOECHO", "private_key": "{PRIVATE}"}}"#);
        assert!(serde_json::from_str::<DispatcherConfig>(&json).is_err());
    }

    #[test]
    fn identity_derives_public_key() {
        let gateway_id = GatewayId::new("*GATEWAY").unwrap();
        let identity = DispatcherConfig::new(gateway_id, PRIVATE).identity().unwrap();

        assert_eq!(
            hex::encode(identity.key_pair.public_key().as_bytes()),
            "8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a"
        );
    }

    #[test]
    fn bad_private_key_is_rejected() {
        let gateway_id = GatewayId::new("*GATEWAY").unwrap();

        let public_instead = DispatcherConfig::new(
            gateway_id,
            "public:8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a",
        );
        assert!(matches!(public_instead.identity(), Err(ConfigError::InvalidPrivateKey(_))));
    }

    #[test]
    fn debug_hides_private_key() {
        let config = DispatcherConfig::new(GatewayId::new("*GATEWAY").unwrap(), PRIVATE);
        assert!(!format!("{config:?}").contains("77076d0a"));
    }

    #[test]
    fn zero_text_limit_is_rejected() {
        let mut config = DispatcherConfig::new(GatewayId::new("*GATEWAY").unwrap(), PRIVATE);
        config.max_text_bytes = 0;
        assert_eq!(config.limits(), Err(ConfigError::ZeroTextLimit));
    }
}
