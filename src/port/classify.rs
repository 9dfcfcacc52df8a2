//! Error classification port.

use std::io;

use crate::error::TransportError;

/// Translates a raw transport failure into the crate's error taxonomy.
///
/// Injected into the lifecycle so tests can substitute a stub and callers
/// can plug in their own taxonomy.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, cause: io::Error) -> TransportError;
}

impl<F> ErrorClassifier for F
where
    F: Fn(io::Error) -> TransportError + Send + Sync,
{
    fn classify(&self, cause: io::Error) -> TransportError {
        self(cause)
    }
}
