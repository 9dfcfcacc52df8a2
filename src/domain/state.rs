//! Per-connection lifecycle state.

use std::fmt;

/// State of one connection as observed through the lifecycle.
///
/// ```text
/// Pending ──create ok──▶ Active ──destroy / peer drop──▶ Closed
///    │
///    └──create err──▶ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connect attempt in flight.
    Pending,
    /// Established and usable.
    Active,
    /// Connect attempt failed. Terminal.
    Failed,
    /// Closed locally or by the peer. Terminal.
    Closed,
}

impl ConnectionState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Failed => "failed",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}
