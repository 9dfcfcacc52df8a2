//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`transport`] - Mock [`Transport`](crate::port::Transport) and
//!   [`Connection`](crate::port::Connection) implementations:
//!   `ScriptedTransport`, `MockConnection`.
//! - [`config`] - Canonical test targets, settings and backoff.

pub mod config;
pub mod transport;
