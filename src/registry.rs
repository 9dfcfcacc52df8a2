//! Registry of live connections.
//!
//! The lifecycle adds every connection it creates and drops the entry again
//! once it closes the connection. The registry holds only weak references,
//! so it never keeps a connection alive; whoever owns the registry uses it
//! for bulk operations such as closing everything at shutdown.
//!
//! One registry may be shared by several lifecycles. Entries are keyed by
//! the connection's allocation rather than its [`ConnectionId`], since ids
//! are only unique per transport.
//!
//! [`ConnectionId`]: crate::domain::ConnectionId

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::port::Connection;

/// Entry count at which `add` first sweeps out dead entries.
const MIN_SWEEP_AT: usize = 64;

/// Concurrent, non-owning index of connections.
///
/// Clones share the same underlying map.
pub struct ConnectionRegistry<C> {
    shared: Arc<Shared<C>>,
}

struct Shared<C> {
    entries: DashMap<usize, Weak<C>>,
    sweep_at: AtomicUsize,
}

/// Address of the connection, stable for as long as an `Arc` or `Weak` to
/// it exists.
fn key<C>(conn: &C) -> usize {
    conn as *const C as usize
}

impl<C> Clone for ConnectionRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C> Default for ConnectionRegistry<C> {
    fn default() -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: DashMap::new(),
                sweep_at: AtomicUsize::new(MIN_SWEEP_AT),
            }),
        }
    }
}

impl<C: Connection> ConnectionRegistry<C> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection.
    ///
    /// Once the map reaches a high-water mark, entries whose connection was
    /// dropped or closed are swept out first, so handles the owner forgot to
    /// destroy do not accumulate.
    pub fn add(&self, conn: &Arc<C>) {
        let shared = &*self.shared;
        if shared.entries.len() >= shared.sweep_at.load(Ordering::Relaxed) {
            let removed = self.retain_live();
            let next = (shared.entries.len() * 2).max(MIN_SWEEP_AT);
            shared.sweep_at.store(next, Ordering::Relaxed);
            debug!(removed, next_sweep_at = next, "Swept registry");
        }
        shared.entries.insert(key(&**conn), Arc::downgrade(conn));
    }

    /// Drop a connection from the registry. Returns whether it was present.
    pub fn remove(&self, conn: &C) -> bool {
        self.shared.entries.remove(&key(conn)).is_some()
    }

    /// Whether this connection is registered.
    #[must_use]
    pub fn contains(&self, conn: &C) -> bool {
        self.shared.entries.contains_key(&key(conn))
    }

    /// Number of entries, including ones whose connection has since gone away.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.entries.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.entries.is_empty()
    }

    /// Connections that are still referenced somewhere and still open.
    #[must_use]
    pub fn live(&self) -> Vec<Arc<C>> {
        self.shared
            .entries
            .iter()
            .filter_map(|entry| entry.value().upgrade())
            .filter(|conn| conn.is_open())
            .collect()
    }

    /// Remove entries whose connection was dropped or closed. Returns the
    /// number removed.
    pub fn prune(&self) -> usize {
        let removed = self.retain_live();
        if removed > 0 {
            debug!(removed, remaining = self.len(), "Pruned registry");
        }
        removed
    }

    /// Close every live connection and empty the registry.
    ///
    /// Returns the number of connections closed successfully. Close failures
    /// are logged and otherwise ignored.
    pub async fn close_all(&self) -> usize {
        let live = self.live();
        self.shared.entries.clear();

        let results = join_all(live.iter().map(|conn| conn.close())).await;

        let mut closed = 0;
        for (conn, result) in live.iter().zip(results) {
            match result {
                Ok(()) => closed += 1,
                Err(e) => warn!(
                    remote = %conn.remote(),
                    id = %conn.id(),
                    error = %e,
                    "Failed to close connection during shutdown"
                ),
            }
        }
        debug!(closed, total = live.len(), "Closed registered connections");
        closed
    }

    fn retain_live(&self) -> usize {
        let entries = &self.shared.entries;
        let before = entries.len();
        entries.retain(|_, weak| weak.upgrade().is_some_and(|conn| conn.is_open()));
        before.saturating_sub(entries.len())
    }
}
