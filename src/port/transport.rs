//! Transport port.
//!
//! The lifecycle never touches sockets directly; everything goes through
//! these traits so the TCP adapter can be swapped for a mock in tests.

use std::io;

use async_trait::async_trait;

use crate::domain::{
    ConnectionId, ConnectionSettings, ConnectionState, SocketOption, TargetAddress,
};

/// One established connection.
///
/// Implementations must be safe to query from many threads at once; the
/// pool validates connections concurrently with closes.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    /// Identifier unique within the transport that created it.
    fn id(&self) -> ConnectionId;

    /// Endpoint this connection was established to.
    fn remote(&self) -> &TargetAddress;

    /// False once the connection has been closed locally.
    fn is_open(&self) -> bool;

    /// Open and still connected to the peer.
    fn is_active(&self) -> bool;

    /// Apply a socket option.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the option could not be set.
    fn set_option(&self, option: SocketOption) -> io::Result<()>;

    /// Close the connection.
    ///
    /// Closing an already-closed connection must succeed.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the orderly close fails.
    async fn close(&self) -> io::Result<()>;

    /// Observed state of an established connection. A handle only exists
    /// after a successful connect, so this is `Active` or `Closed`.
    fn state(&self) -> ConnectionState {
        if self.is_active() {
            ConnectionState::Active
        } else {
            ConnectionState::Closed
        }
    }
}

/// Connect primitive.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Conn: Connection;

    /// Establish a connection to `target`.
    ///
    /// Connect timeouts, when configured in `settings`, are enforced here.
    ///
    /// # Errors
    ///
    /// Returns the raw I/O failure; classification is the caller's job.
    async fn connect(
        &self,
        target: &TargetAddress,
        settings: &ConnectionSettings,
    ) -> io::Result<Self::Conn>;
}
