//! Connection lifecycle adapter.
//!
//! [`ChannelLifecycle`] is the delegate a connection pool calls to create,
//! validate and destroy individual connections to one target. It owns the
//! connect-latency tracker and classifies creation failures so the pool's
//! backoff knows which ones are safe to retry.
//!
//! Two surfaces share one implementation:
//!
//! - `async fn create` / `async fn destroy` for callers already in async code.
//! - The [`Lifecycle`] trait, which runs the same futures on the tokio runtime
//!   and reports completion through a callback.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lifeline::adapter::{IoErrorClassifier, TcpTransport};
//! use lifeline::domain::{ConnectionSettings, TargetAddress};
//! use lifeline::lifecycle::ChannelLifecycle;
//! use lifeline::registry::ConnectionRegistry;
//!
//! # async fn run() -> Result<(), lifeline::error::LifecycleError> {
//! let lifecycle = ChannelLifecycle::new(
//!     TargetAddress::new("127.0.0.1", 8080),
//!     ConnectionSettings::default(),
//!     TcpTransport::new(),
//!     ConnectionRegistry::new(),
//!     Arc::new(IoErrorClassifier),
//! );
//!
//! let conn = lifecycle.create().await?;
//! assert!(lifecycle.validate_get(&conn));
//! lifecycle.destroy(conn, false).await?;
//! println!("{:?}", lifecycle.stats());
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod tracker;

pub use backoff::{RetryBackoff, INITIAL_RETRY_DELAY, MAX_RETRY_DELAY};
pub use tracker::LatencyTracker;

use std::io;
use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;
use tracing::{debug, error, warn};

use crate::adapter::{IoErrorClassifier, TcpTransport};
use crate::config::Config;
use crate::domain::{ConnectionSettings, LifecycleStats, TargetAddress};
use crate::error::LifecycleError;
use crate::port::{Callback, Connection, ErrorClassifier, Lifecycle, Transport};
use crate::registry::ConnectionRegistry;

/// Lifecycle adapter for connections to a single target.
///
/// Cheap to clone; clones share the transport, registry and latency tracker.
pub struct ChannelLifecycle<T: Transport> {
    inner: Arc<Inner<T>>,
}

struct Inner<T: Transport> {
    target: TargetAddress,
    settings: ConnectionSettings,
    transport: T,
    registry: ConnectionRegistry<T::Conn>,
    classifier: Arc<dyn ErrorClassifier>,
    tracker: LatencyTracker,
    runtime: Option<Handle>,
}

impl<T: Transport> Clone for ChannelLifecycle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ChannelLifecycle<TcpTransport> {
    /// TCP lifecycle for the configured target with the default classifier
    /// and a fresh registry.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.target.address(),
            config.connection.settings(),
            TcpTransport::new(),
            ConnectionRegistry::new(),
            Arc::new(IoErrorClassifier),
        )
    }
}

impl<T: Transport> ChannelLifecycle<T> {
    /// Create a lifecycle.
    ///
    /// If called inside a tokio runtime, that runtime runs the callback
    /// surface of [`Lifecycle`]; otherwise the runtime current at call time
    /// is used.
    pub fn new(
        target: TargetAddress,
        settings: ConnectionSettings,
        transport: T,
        registry: ConnectionRegistry<T::Conn>,
        classifier: Arc<dyn ErrorClassifier>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                target,
                settings,
                transport,
                registry,
                classifier,
                tracker: LatencyTracker::new(),
                runtime: Handle::try_current().ok(),
            }),
        }
    }

    /// Address every connection is opened to.
    #[must_use]
    pub fn target(&self) -> &TargetAddress {
        &self.inner.target
    }

    /// Connect timeout and socket options applied to new connections.
    #[must_use]
    pub fn settings(&self) -> &ConnectionSettings {
        &self.inner.settings
    }

    /// Registry every successfully created connection is added to.
    #[must_use]
    pub fn registry(&self) -> &ConnectionRegistry<T::Conn> {
        &self.inner.registry
    }

    /// Establish a new connection to the target.
    ///
    /// On success the connect latency is recorded, configured socket options
    /// are applied and the connection is added to the registry before it is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Retriable`] if the remote refused the connection.
    /// - [`LifecycleError::Connect`] for any other failure, as classified by
    ///   the injected [`ErrorClassifier`].
    pub async fn create(&self) -> Result<Arc<T::Conn>, LifecycleError> {
        let inner = &*self.inner;
        let start = Instant::now();

        match inner.transport.connect(&inner.target, &inner.settings).await {
            Ok(conn) => {
                let elapsed = start.elapsed();
                inner.tracker.record_duration(elapsed);

                let conn = Arc::new(conn);
                for option in inner.settings.socket_options() {
                    if let Err(e) = conn.set_option(option) {
                        warn!(
                            remote = %inner.target,
                            id = %conn.id(),
                            option = ?option,
                            error = %e,
                            "Failed to apply socket option"
                        );
                    }
                }
                inner.registry.add(&conn);

                debug!(
                    remote = %inner.target,
                    id = %conn.id(),
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "Connection created"
                );
                Ok(conn)
            }
            Err(cause) => {
                error!(
                    remote = %inner.target,
                    error = %cause,
                    "Failed to create connection"
                );
                if cause.kind() == io::ErrorKind::ConnectionRefused {
                    Err(LifecycleError::Retriable {
                        remote: inner.target.clone(),
                        source: cause,
                    })
                } else {
                    Err(LifecycleError::Connect(inner.classifier.classify(cause)))
                }
            }
        }
    }

    /// Whether a connection may be handed out of the pool.
    #[must_use]
    pub fn validate_get(&self, conn: &T::Conn) -> bool {
        conn.is_active()
    }

    /// Whether a returned connection may go back into the pool.
    #[must_use]
    pub fn validate_put(&self, conn: &T::Conn) -> bool {
        conn.is_active()
    }

    /// Close a connection.
    ///
    /// A connection that is already closed completes immediately with
    /// success. Either way a closed connection leaves the registry.
    /// `had_error` is informational only.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Close`] if closing an open connection fails.
    pub async fn destroy(
        &self,
        conn: Arc<T::Conn>,
        had_error: bool,
    ) -> Result<Arc<T::Conn>, LifecycleError> {
        let inner = &*self.inner;

        if !conn.is_open() {
            debug!(remote = %inner.target, id = %conn.id(), "Connection already closed");
            inner.registry.remove(&conn);
            return Ok(conn);
        }

        debug!(
            remote = %inner.target,
            id = %conn.id(),
            state = %conn.state(),
            had_error,
            "Destroying connection"
        );

        match conn.close().await {
            Ok(()) => {
                inner.registry.remove(&conn);
                Ok(conn)
            }
            Err(cause) => {
                error!(
                    remote = %inner.target,
                    id = %conn.id(),
                    error = %cause,
                    "Failed to destroy connection"
                );
                Err(LifecycleError::Close(inner.classifier.classify(cause)))
            }
        }
    }

    /// Connect latency distribution since the previous call; resets the
    /// tracker.
    pub fn stats(&self) -> LifecycleStats {
        self.inner.tracker.snapshot_and_reset()
    }

    fn runtime(&self) -> Option<Handle> {
        self.inner
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
    }
}

/// Owns a callback until it fires.
///
/// If the spawned task is dropped before completing (runtime shut down, or
/// the future panicked), the callback still fires once, with a runtime error.
struct CallbackGuard<C> {
    callback: Option<Callback<C>>,
    op: &'static str,
}

impl<C> CallbackGuard<C> {
    fn new(op: &'static str, callback: Callback<C>) -> Self {
        Self {
            callback: Some(callback),
            op,
        }
    }

    fn fire(mut self, result: Result<Arc<C>, LifecycleError>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<C> Drop for CallbackGuard<C> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            warn!(op = self.op, "Lifecycle task dropped before completion");
            callback(Err(LifecycleError::Runtime(format!(
                "{} dropped before completion",
                self.op
            ))));
        }
    }
}

impl<T: Transport> Lifecycle<T::Conn> for ChannelLifecycle<T> {
    fn create(&self, callback: Callback<T::Conn>) {
        let guard = CallbackGuard::new("create", callback);
        let Some(runtime) = self.runtime() else {
            guard.fire(Err(LifecycleError::Runtime(
                "create requires a tokio runtime".into(),
            )));
            return;
        };

        let this = self.clone();
        runtime.spawn(async move {
            guard.fire(this.create().await);
        });
    }

    fn validate_get(&self, conn: &T::Conn) -> bool {
        ChannelLifecycle::validate_get(self, conn)
    }

    fn validate_put(&self, conn: &T::Conn) -> bool {
        ChannelLifecycle::validate_put(self, conn)
    }

    fn destroy(&self, conn: Arc<T::Conn>, error: bool, callback: Callback<T::Conn>) {
        let guard = CallbackGuard::new("destroy", callback);
        if !conn.is_open() {
            self.inner.registry.remove(&conn);
            guard.fire(Ok(conn));
            return;
        }

        let Some(runtime) = self.runtime() else {
            guard.fire(Err(LifecycleError::Runtime(
                "destroy requires a tokio runtime".into(),
            )));
            return;
        };

        let this = self.clone();
        runtime.spawn(async move {
            guard.fire(this.destroy(conn, error).await);
        });
    }

    fn stats(&self) -> LifecycleStats {
        ChannelLifecycle::stats(self)
    }
}
