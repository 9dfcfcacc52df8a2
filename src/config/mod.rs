//! Configuration loading and validation.
//!
//! Configuration is read from a TOML file. Every section and every field has
//! a default except the target port, which must be set in the file or
//! overridden on the command line.
//!
//! # Example
//!
//! ```
//! use lifeline::config::Config;
//!
//! let config = Config::parse_toml(
//!     r#"
//!     [target]
//!     host = "10.0.0.5"
//!     port = 6379
//!
//!     [connection]
//!     tcp_nodelay = true
//!     connect_timeout_ms = 2000
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.target.address().to_string(), "10.0.0.5:6379");
//! assert_eq!(config.backoff.initial_delay_ms, 100);
//! ```

mod backoff;
mod connection;
mod logging;
mod target;

pub use backoff::BackoffConfig;
pub use connection::ConnectionConfig;
pub use logging::LoggingConfig;
pub use target::TargetConfig;

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Endpoint every connection is made to.
    #[serde(default)]
    pub target: TargetConfig,

    /// Socket settings applied to each connection.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Retry cadence for refused connections.
    #[serde(default)]
    pub backoff: BackoffConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file without validating it.
    ///
    /// Lets callers apply overrides before calling [`Config::validate`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Ok(toml::from_str(&content).map_err(ConfigError::Parse)?)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or fails validation.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        self.target.validate()?;
        self.connection.validate()?;
        self.backoff.validate()?;
        Ok(())
    }
}
