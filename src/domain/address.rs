//! Remote endpoint identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Host and port of the remote endpoint a lifecycle connects to.
///
/// The host is kept unresolved; resolution happens on every connect so a
/// long-lived lifecycle follows DNS changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetAddress {
    host: String,
    port: u16,
}

impl TargetAddress {
    /// Create a new target from a host name or IP literal and a port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// The `(host, port)` pair accepted by `tokio::net::lookup_host`.
    #[must_use]
    pub fn as_pair(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for TargetAddress {
    type Err = ConfigError;

    /// Parse `host:port` or `[v6-literal]:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidValue {
            field: "target",
            reason: format!("'{s}': {reason}"),
        };

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| invalid("unterminated '[' in IPv6 address"))?;
            let port = tail
                .strip_prefix(':')
                .ok_or_else(|| invalid("missing port"))?;
            (host, port)
        } else {
            s.rsplit_once(':').ok_or_else(|| invalid("missing port"))?
        };

        if host.is_empty() {
            return Err(invalid("empty host"));
        }
        let port: u16 = port.parse().map_err(|_| invalid("invalid port"))?;
        if port == 0 {
            return Err(invalid("port must be > 0"));
        }

        Ok(Self::new(host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let addr: TargetAddress = "localhost:8080".parse().unwrap();
        assert_eq!(addr.host(), "localhost");
        assert_eq!(addr.port(), 8080);
        assert_eq!(addr.to_string(), "localhost:8080");
    }

    #[test]
    fn parses_bracketed_ipv6() {
        let addr: TargetAddress = "[::1]:443".parse().unwrap();
        assert_eq!(addr.host(), "::1");
        assert_eq!(addr.port(), 443);
        assert_eq!(addr.to_string(), "[::1]:443");
    }

    #[test]
    fn rejects_missing_port() {
        assert!("localhost".parse::<TargetAddress>().is_err());
        assert!("[::1]".parse::<TargetAddress>().is_err());
    }

    #[test]
    fn rejects_bad_port() {
        assert!("localhost:http".parse::<TargetAddress>().is_err());
        assert!("localhost:70000".parse::<TargetAddress>().is_err());
        assert!("localhost:0".parse::<TargetAddress>().is_err());
    }

    #[test]
    fn rejects_empty_host() {
        assert!(":80".parse::<TargetAddress>().is_err());
    }
}
