//! Lifeline - connection lifecycle management for TCP connection pools.
//!
//! A pool owns the policy: how many connections, when to hand one out, when
//! to retry. This crate supplies the delegate that does the per-connection
//! work: establish a connection to a target, decide whether it is still
//! usable, close it, and report how long connects are taking.
//!
//! # Architecture
//!
//! The crate follows a ports-and-adapters layout:
//!
//! - **`port`** - Traits the lifecycle depends on (`Transport`, `Connection`,
//!   `ErrorClassifier`) and the `Lifecycle` callback contract it exposes
//! - **`adapter`** - Tokio TCP transport and the default error classifier
//! - **`lifecycle`** - `ChannelLifecycle`, the latency tracker and retry backoff
//! - **`registry`** - Non-owning index of live connections
//!
//! # Modules
//!
//! - [`adapter`] - TCP transport and I/O error classification
//! - [`cli`] - Command-line interface for the `lifeline` binary
//! - [`config`] - Configuration loading from TOML files
//! - [`domain`] - Target addresses, socket settings, connection ids, stats
//! - [`error`] - Error types for the crate
//! - [`lifecycle`] - Create / validate / destroy and latency statistics
//! - [`port`] - Trait definitions
//! - [`registry`] - Connection registry
//!
//! # Features
//!
//! - `testkit` - Scripted transport and mock connection for downstream tests
//!
//! # Example
//!
//! ```no_run
//! use lifeline::prelude::*;
//!
//! # async fn run() -> lifeline::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let lifecycle = ChannelLifecycle::from_config(&config);
//!
//! match lifecycle.create().await {
//!     Ok(conn) => {
//!         lifecycle.destroy(conn, false).await?;
//!     }
//!     Err(e) if e.is_retriable() => {
//!         let mut backoff = RetryBackoff::new(config.backoff.clone());
//!         tokio::time::sleep(backoff.next_delay()).await;
//!     }
//!     Err(e) => return Err(e.into()),
//! }
//! println!("{:?}", lifecycle.stats());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod port;
pub mod registry;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

/// Commonly used types.
pub mod prelude {
    pub use crate::adapter::{IoErrorClassifier, TcpConnection, TcpTransport};
    pub use crate::config::Config;
    pub use crate::domain::{
        ConnectionId, ConnectionSettings, ConnectionState, LifecycleStats, SocketOption,
        TargetAddress,
    };
    pub use crate::error::{LifecycleError, TransportError};
    pub use crate::lifecycle::{ChannelLifecycle, LatencyTracker, RetryBackoff};
    pub use crate::port::{Callback, Connection, ErrorClassifier, Lifecycle, Transport};
    pub use crate::registry::ConnectionRegistry;
}
