//! Per-connection socket configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::ConnectionSettings;
use crate::error::ConfigError;

/// Socket settings, mapped to [`ConnectionSettings`] at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Disable Nagle's algorithm.
    #[serde(default = "default_tcp_nodelay")]
    pub tcp_nodelay: bool,
    /// Connect timeout (milliseconds). Unset waits for the OS.
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    /// IP time-to-live.
    #[serde(default)]
    pub ttl: Option<u32>,
    /// `SO_LINGER` (milliseconds).
    #[serde(default)]
    pub linger_ms: Option<u64>,
}

const fn default_tcp_nodelay() -> bool {
    true
}

impl ConnectionConfig {
    #[must_use]
    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            tcp_nodelay: self.tcp_nodelay,
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
            ttl: self.ttl,
            linger: self.linger_ms.map(Duration::from_millis),
        }
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "connection.connect_timeout_ms",
                reason: "must be > 0 when set".into(),
            });
        }
        if self.ttl == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "connection.ttl",
                reason: "must be > 0 when set".into(),
            });
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            tcp_nodelay: default_tcp_nodelay(),
            connect_timeout_ms: None,
            ttl: None,
            linger_ms: None,
        }
    }
}
