//! Retry backoff configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// Backoff applied by the caller between creation attempts after a
/// retriable failure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackoffConfig {
    /// Delay before the first retry (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Maximum delay between retries (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each attempt.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Add up to 20% random jitter to each delay.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

const fn default_initial_delay_ms() -> u64 {
    100
}

const fn default_max_delay_ms() -> u64 {
    5000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_jitter() -> bool {
    true
}

impl BackoffConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "backoff.initial_delay_ms",
                reason: "must be <= max_delay_ms".into(),
            });
        }
        if !(self.multiplier >= 1.0 && self.multiplier.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "backoff.multiplier",
                reason: "must be a finite value >= 1.0".into(),
            });
        }
        Ok(())
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
        }
    }
}
