//! Pool-facing lifecycle contract.
//!
//! A connection pool holds a `Lifecycle` and calls it whenever it needs a new
//! connection, hands one out, takes one back, or evicts one. Completion of
//! the asynchronous operations is delivered through a [`Callback`].

use std::sync::Arc;

use crate::domain::LifecycleStats;
use crate::error::LifecycleError;

/// Completion callback for `create` and `destroy`.
///
/// Invoked exactly once, with either the connection or the failure, from
/// whichever thread completes the operation.
pub type Callback<C> = Box<dyn FnOnce(Result<Arc<C>, LifecycleError>) + Send + 'static>;

/// Create, validate and destroy connections on behalf of a pool.
pub trait Lifecycle<C>: Send + Sync {
    /// Start establishing a new connection. Never blocks.
    fn create(&self, callback: Callback<C>);

    /// Check a connection before it is handed out.
    fn validate_get(&self, conn: &C) -> bool;

    /// Check a connection as it is returned.
    fn validate_put(&self, conn: &C) -> bool;

    /// Tear down a connection. `error` records whether this follows a
    /// failure and does not change behavior.
    fn destroy(&self, conn: Arc<C>, error: bool, callback: Callback<C>);

    /// Snapshot and reset the connect latency distribution.
    fn stats(&self) -> LifecycleStats;
}
