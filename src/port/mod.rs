//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`Transport`], [`Connection`] - Connect/close primitives and per-connection queries
//! - [`ErrorClassifier`] - Translation of raw transport failures into [`TransportError`](crate::error::TransportError)
//! - [`Lifecycle`] - Callback contract a connection pool drives

mod classify;
mod lifecycle;
mod transport;

pub use classify::ErrorClassifier;
pub use lifecycle::{Callback, Lifecycle};
pub use transport::{Connection, Transport};
