//! TCP transport backed by `tokio::net::TcpStream`.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use crate::domain::{
    ConnectionId, ConnectionIdGenerator, ConnectionSettings, SocketOption, TargetAddress,
};
use crate::port::{Connection, Transport};

/// Connects with `TcpStream::connect`, resolving the host on every attempt.
#[derive(Debug, Default)]
pub struct TcpTransport {
    ids: ConnectionIdGenerator,
}

impl TcpTransport {
    /// Transport whose connection ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for TcpTransport {
    type Conn = TcpConnection;

    async fn connect(
        &self,
        target: &TargetAddress,
        settings: &ConnectionSettings,
    ) -> io::Result<TcpConnection> {
        let connect = TcpStream::connect(target.as_pair());
        let stream = connect_within(settings.connect_timeout, target, connect).await?;

        let conn = TcpConnection::new(self.ids.next_id(), target.clone(), stream);
        trace!(remote = %target, id = %conn.id, peer = ?conn.peer_addr, "TCP connected");
        Ok(conn)
    }
}

/// Run a connect future under an optional time limit.
///
/// Expiry surfaces as `io::ErrorKind::TimedOut`, which the classifier maps to
/// a timeout.
pub(crate) async fn connect_within<F, T>(
    limit: Option<Duration>,
    target: &TargetAddress,
    connect: F,
) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    let Some(limit) = limit else {
        return connect.await;
    };
    timeout(limit, connect).await.map_err(|_| {
        io::Error::new(
            io::ErrorKind::TimedOut,
            format!("connect to {target} timed out after {}ms", limit.as_millis()),
        )
    })?
}

/// One TCP connection.
///
/// The stream is dropped on close; queries after that report closed.
#[derive(Debug)]
pub struct TcpConnection {
    id: ConnectionId,
    remote: TargetAddress,
    peer_addr: Option<SocketAddr>,
    local_addr: Option<SocketAddr>,
    open: AtomicBool,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpConnection {
    fn new(id: ConnectionId, remote: TargetAddress, stream: TcpStream) -> Self {
        Self {
            id,
            remote,
            peer_addr: stream.peer_addr().ok(),
            local_addr: stream.local_addr().ok(),
            open: AtomicBool::new(true),
            stream: Mutex::new(Some(stream)),
        }
    }

    /// Resolved address of the peer at connect time.
    #[must_use]
    pub const fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Local address the socket was bound to.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Current `TCP_NODELAY` setting.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` once the connection is closed.
    pub fn nodelay(&self) -> io::Result<bool> {
        match self.stream.lock().as_ref() {
            Some(stream) => stream.nodelay(),
            None => Err(io::ErrorKind::NotConnected.into()),
        }
    }

    /// Current IP time-to-live.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` once the connection is closed.
    pub fn ttl(&self) -> io::Result<u32> {
        match self.stream.lock().as_ref() {
            Some(stream) => stream.ttl(),
            None => Err(io::ErrorKind::NotConnected.into()),
        }
    }
}

#[async_trait]
impl Connection for TcpConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn remote(&self) -> &TargetAddress {
        &self.remote
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn is_active(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.stream
            .lock()
            .as_ref()
            .is_some_and(|stream| stream.peer_addr().is_ok())
    }

    #[allow(deprecated)]
    fn set_option(&self, option: SocketOption) -> io::Result<()> {
        let guard = self.stream.lock();
        let stream = guard
            .as_ref()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))?;
        match option {
            SocketOption::NoDelay(enabled) => stream.set_nodelay(enabled),
            SocketOption::Ttl(ttl) => stream.set_ttl(ttl),
            SocketOption::Linger(linger) => stream.set_linger(linger),
        }
    }

    async fn close(&self) -> io::Result<()> {
        self.open.store(false, Ordering::Release);
        let stream = self.stream.lock().take();
        let Some(mut stream) = stream else {
            return Ok(());
        };

        match stream.shutdown().await {
            Ok(()) => Ok(()),
            // Peer already tore the connection down; dropping the stream is
            // all that is left to do.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_test::{assert_err, assert_ok};

    async fn listener() -> (TcpListener, TargetAddress) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, TargetAddress::new("127.0.0.1", port))
    }

    #[tokio::test]
    async fn connects_and_assigns_sequential_ids() {
        let (_listener, target) = listener().await;
        let transport = TcpTransport::new();
        let settings = ConnectionSettings::default();

        let first = transport.connect(&target, &settings).await.unwrap();
        let second = transport.connect(&target, &settings).await.unwrap();

        assert_eq!(first.id().value(), 1);
        assert_eq!(second.id().value(), 2);
        assert!(first.is_open());
        assert!(first.is_active());
        assert_eq!(first.remote(), &target);
        assert_eq!(first.peer_addr().map(|a| a.port()), Some(target.port()));
    }

    #[tokio::test]
    async fn refused_connect_reports_connection_refused() {
        let (listener, target) = listener().await;
        drop(listener);

        let err = TcpTransport::new()
            .connect(&target, &ConnectionSettings::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    }

    #[tokio::test]
    async fn set_option_nodelay() {
        let (_listener, target) = listener().await;
        let conn = TcpTransport::new()
            .connect(&target, &ConnectionSettings::default())
            .await
            .unwrap();

        conn.set_option(SocketOption::NoDelay(true)).unwrap();
        assert!(conn.nodelay().unwrap());
        conn.set_option(SocketOption::NoDelay(false)).unwrap();
        assert!(!conn.nodelay().unwrap());
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (_listener, target) = listener().await;
        let conn = TcpTransport::new()
            .connect(&target, &ConnectionSettings::default())
            .await
            .unwrap();

        assert_ok!(conn.close().await);
        assert!(!conn.is_open());
        assert!(!conn.is_active());
        assert_ok!(conn.close().await);
    }

    #[tokio::test]
    async fn options_fail_after_close() {
        let (_listener, target) = listener().await;
        let conn = TcpTransport::new()
            .connect(&target, &ConnectionSettings::default())
            .await
            .unwrap();
        conn.close().await.unwrap();

        let err = conn.set_option(SocketOption::Ttl(10)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert_err!(conn.nodelay());
        assert_err!(conn.ttl());
    }

    #[tokio::test]
    async fn connect_within_times_out_pending_connect() {
        let target = TargetAddress::new("127.0.0.1", 9);
        let pending = std::future::pending::<io::Result<()>>();

        let err = connect_within(Some(Duration::from_millis(10)), &target, pending)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(err.to_string().contains("timed out after 10ms"));
    }

    #[tokio::test]
    async fn connect_within_without_limit_awaits_result() {
        let target = TargetAddress::new("127.0.0.1", 9);

        assert_ok!(connect_within(None, &target, async { Ok::<_, io::Error>(()) }).await);
        assert_err!(connect_within(None, &target, async { Err::<(), _>(refused()) }).await);
    }

    fn refused() -> io::Error {
        io::Error::from(io::ErrorKind::ConnectionRefused)
    }

    #[tokio::test]
    async fn ttl_option_is_applied() {
        let (_listener, target) = listener().await;
        let conn = TcpTransport::new()
            .connect(&target, &ConnectionSettings::default())
            .await
            .unwrap();

        assert_ok!(conn.set_option(SocketOption::Ttl(17)));
        assert_eq!(conn.ttl().unwrap(), 17);
    }
}
