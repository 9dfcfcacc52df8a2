//! Error types for the crate.
//!
//! [`LifecycleError`] is what the pool sees from `create` and `destroy`.
//! [`TransportError`] is the classified form of a raw transport failure,
//! produced by an [`ErrorClassifier`](crate::port::ErrorClassifier).

use std::io;

use thiserror::Error;

use crate::domain::TargetAddress;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Classified transport failure.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("operation timed out: {0}")]
    Timeout(#[source] io::Error),

    #[error("connection reset by peer: {0}")]
    Reset(#[source] io::Error),

    #[error("unable to resolve host: {0}")]
    Unresolved(#[source] io::Error),

    #[error("connection already closed: {0}")]
    Closed(#[source] io::Error),

    #[error("transport error: {0}")]
    Io(#[source] io::Error),
}

impl TransportError {
    /// The underlying I/O error.
    #[must_use]
    pub fn cause(&self) -> &io::Error {
        match self {
            Self::Timeout(e)
            | Self::Reset(e)
            | Self::Unresolved(e)
            | Self::Closed(e)
            | Self::Io(e) => e,
        }
    }
}

/// Failure reported by a lifecycle operation.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The remote end refused the connection. Another attempt may succeed.
    #[error("connection to {remote} refused, retry allowed: {source}")]
    Retriable {
        remote: TargetAddress,
        #[source]
        source: io::Error,
    },

    /// Connection could not be established and should not be blindly retried.
    #[error("failed to connect: {0}")]
    Connect(#[source] TransportError),

    /// Closing an open connection failed.
    #[error("failed to close connection: {0}")]
    Close(#[source] TransportError),

    /// No async runtime was available to run the operation on.
    #[error("no runtime available: {0}")]
    Runtime(String),
}

impl LifecycleError {
    /// True when the pool may schedule another creation attempt after backoff.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Retriable { .. })
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
