//! Per-connection socket settings.

use std::time::Duration;

/// A socket option the lifecycle applies to each new connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketOption {
    /// `TCP_NODELAY`; `true` disables Nagle's algorithm.
    NoDelay(bool),
    /// IP time-to-live.
    Ttl(u32),
    /// `SO_LINGER`; `None` restores the system default.
    Linger(Option<Duration>),
}

/// Immutable settings used to establish every connection from one lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Disable Nagle's algorithm on every new connection.
    pub tcp_nodelay: bool,
    /// Connect timeout enforced by the transport. `None` waits for the OS.
    pub connect_timeout: Option<Duration>,
    pub ttl: Option<u32>,
    pub linger: Option<Duration>,
}

impl ConnectionSettings {
    /// Socket options to apply to a freshly established connection, in order.
    #[must_use]
    pub fn socket_options(&self) -> Vec<SocketOption> {
        let mut options = Vec::with_capacity(3);
        if self.tcp_nodelay {
            options.push(SocketOption::NoDelay(true));
        }
        if let Some(ttl) = self.ttl {
            options.push(SocketOption::Ttl(ttl));
        }
        if let Some(linger) = self.linger {
            options.push(SocketOption::Linger(Some(linger)));
        }
        options
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            tcp_nodelay: true,
            connect_timeout: None,
            ttl: None,
            linger: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_only_sets_nodelay() {
        let settings = ConnectionSettings::default();
        assert_eq!(settings.socket_options(), vec![SocketOption::NoDelay(true)]);
    }

    #[test]
    fn nodelay_disabled_applies_nothing() {
        let settings = ConnectionSettings {
            tcp_nodelay: false,
            ..Default::default()
        };
        assert!(settings.socket_options().is_empty());
    }

    #[test]
    fn all_options_in_order() {
        let settings = ConnectionSettings {
            tcp_nodelay: true,
            connect_timeout: Some(Duration::from_secs(1)),
            ttl: Some(32),
            linger: Some(Duration::ZERO),
        };
        assert_eq!(
            settings.socket_options(),
            vec![
                SocketOption::NoDelay(true),
                SocketOption::Ttl(32),
                SocketOption::Linger(Some(Duration::ZERO)),
            ]
        );
    }
}
