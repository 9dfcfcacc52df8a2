//! Mock transport and connection for testing.
//!
//! - [`ScriptedTransport`] - Pre-loaded connect results, shared connect
//!   counter, optional per-connect delay.
//! - [`MockConnection`] - Controllable open/active flags, scripted close
//!   results, recorded socket options.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::adapter::tcp::connect_within;
use crate::domain::{
    ConnectionId, ConnectionIdGenerator, ConnectionSettings, SocketOption, TargetAddress,
};
use crate::port::{Connection, Transport};

// ---------------------------------------------------------------------------
// MockConnection
// ---------------------------------------------------------------------------

/// A connection whose state is driven by the test.
///
/// Each call to `close()` pops the next scripted result (defaults to `Ok(())`
/// when exhausted). A successful close marks the connection closed; a failed
/// one leaves it open.
#[derive(Debug)]
pub struct MockConnection {
    id: ConnectionId,
    remote: TargetAddress,
    open: AtomicBool,
    active: AtomicBool,
    close_results: Mutex<VecDeque<io::Result<()>>>,
    close_count: AtomicU32,
    options: Mutex<Vec<SocketOption>>,
    reject_options: AtomicBool,
}

impl MockConnection {
    pub fn new(id: ConnectionId, remote: TargetAddress) -> Self {
        Self {
            id,
            remote,
            open: AtomicBool::new(true),
            active: AtomicBool::new(true),
            close_results: Mutex::new(VecDeque::new()),
            close_count: AtomicU32::new(0),
            options: Mutex::new(Vec::new()),
            reject_options: AtomicBool::new(false),
        }
    }

    pub fn with_close_results(self, results: Vec<io::Result<()>>) -> Self {
        *self.close_results.lock() = results.into();
        self
    }

    /// Make every `set_option` call fail.
    pub fn rejecting_options(self) -> Self {
        self.reject_options.store(true, Ordering::SeqCst);
        self
    }

    /// Simulate the peer dropping the connection.
    pub fn drop_peer(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.open.store(false, Ordering::SeqCst);
    }

    /// Simulate a half-dead connection: still open locally, no longer usable.
    pub fn go_stale(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn close_count(&self) -> u32 {
        self.close_count.load(Ordering::SeqCst)
    }

    /// Socket options applied so far, in order.
    pub fn options(&self) -> Vec<SocketOption> {
        self.options.lock().clone()
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn remote(&self) -> &TargetAddress {
        &self.remote
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn is_active(&self) -> bool {
        self.is_open() && self.active.load(Ordering::SeqCst)
    }

    fn set_option(&self, option: SocketOption) -> io::Result<()> {
        if self.reject_options.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "option rejected by mock",
            ));
        }
        self.options.lock().push(option);
        Ok(())
    }

    async fn close(&self) -> io::Result<()> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        let result = self.close_results.lock().pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            self.drop_peer();
        }
        result
    }
}

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

/// A transport with scripted connect results.
///
/// Each call to `connect()` pops the next result from the queue (defaults to
/// `Ok(())` when exhausted). `Ok` produces a fresh [`MockConnection`] to the
/// requested target. The configured connect timeout bounds the delay, the
/// same way it bounds a real TCP connect.
#[derive(Debug)]
pub struct ScriptedTransport {
    connect_results: Mutex<VecDeque<io::Result<()>>>,
    connect_count: Arc<AtomicU32>,
    delay: Option<Duration>,
    reject_options: bool,
    ids: ConnectionIdGenerator,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            connect_results: Mutex::new(VecDeque::new()),
            connect_count: Arc::new(AtomicU32::new(0)),
            delay: None,
            reject_options: false,
            ids: ConnectionIdGenerator::new(),
        }
    }

    pub fn with_connect_results(self, results: Vec<io::Result<()>>) -> Self {
        *self.connect_results.lock() = results.into();
        self
    }

    /// Sleep this long inside every `connect()`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Produce connections that reject every socket option.
    pub fn rejecting_options(mut self) -> Self {
        self.reject_options = true;
        self
    }

    /// Shared counter for asserting connect call counts.
    pub fn counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.connect_count)
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }

    fn next_result(&self) -> io::Result<()> {
        self.connect_results.lock().pop_front().unwrap_or(Ok(()))
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    type Conn = MockConnection;

    async fn connect(
        &self,
        target: &TargetAddress,
        settings: &ConnectionSettings,
    ) -> io::Result<MockConnection> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        let scripted = async {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.next_result()
        };
        connect_within(settings.connect_timeout, target, scripted).await?;

        let conn = MockConnection::new(self.ids.next_id(), target.clone());
        Ok(if self.reject_options {
            conn.rejecting_options()
        } else {
            conn
        })
    }
}

/// Shorthand for a refused-connection error.
pub fn refused() -> io::Error {
    io::Error::from(io::ErrorKind::ConnectionRefused)
}
