//! Default error classifier over `std::io::Error`.

use std::io;

use crate::error::TransportError;
use crate::port::ErrorClassifier;

/// Maps `io::ErrorKind` (and resolver failures, which surface without a
/// dedicated kind) onto [`TransportError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IoErrorClassifier;

impl ErrorClassifier for IoErrorClassifier {
    fn classify(&self, cause: io::Error) -> TransportError {
        match cause.kind() {
            io::ErrorKind::TimedOut => TransportError::Timeout(cause),
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => TransportError::Reset(cause),
            io::ErrorKind::NotConnected => TransportError::Closed(cause),
            io::ErrorKind::NotFound => TransportError::Unresolved(cause),
            _ if is_resolve_failure(&cause) => TransportError::Unresolved(cause),
            _ => TransportError::Io(cause),
        }
    }
}

fn is_resolve_failure(cause: &io::Error) -> bool {
    let message = cause.to_string();
    message.contains("failed to lookup address")
        || message.contains("could not resolve")
        || message.contains("Name or service not known")
        || message.contains("nodename nor servname")
}
