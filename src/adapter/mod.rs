//! Implementations of ports (hexagonal adapters).

pub mod classify;
pub mod tcp;

pub use classify::IoErrorClassifier;
pub use tcp::{TcpConnection, TcpTransport};
