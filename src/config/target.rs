//! Target endpoint configuration.

use serde::Deserialize;

use crate::domain::TargetAddress;
use crate::error::ConfigError;

/// Remote endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// Required; `0` means unset.
    #[serde(default)]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

impl TargetConfig {
    #[must_use]
    pub fn address(&self) -> TargetAddress {
        TargetAddress::new(self.host.clone(), self.port)
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "target.host",
                reason: "must not be empty".into(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::MissingField {
                field: "target.port",
            });
        }
        Ok(())
    }
}

impl From<TargetAddress> for TargetConfig {
    fn from(address: TargetAddress) -> Self {
        Self {
            host: address.host().to_string(),
            port: address.port(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 0,
        }
    }
}
