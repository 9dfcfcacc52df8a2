//! Retry cadence for retriable creation failures.
//!
//! The lifecycle only classifies a failure as retriable; the pool owns the
//! waiting. These constants and [`RetryBackoff`] are what it should use.

use std::time::Duration;

use rand::Rng;

use crate::config::BackoffConfig;

/// Delay before the second attempt after the first retriable failure.
pub const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Upper bound on the delay between creation attempts.
pub const MAX_RETRY_DELAY: Duration = Duration::from_millis(5000);

/// Exponential backoff schedule.
///
/// Starts at `initial_delay_ms`, multiplies by `multiplier` after every
/// attempt and never exceeds `max_delay_ms`, jitter included. With jitter
/// enabled, up to 20% of the base delay is added at random.
#[derive(Debug, Clone)]
pub struct RetryBackoff {
    config: BackoffConfig,
    current_delay_ms: u64,
    attempts: u32,
}

impl RetryBackoff {
    #[must_use]
    pub fn new(config: BackoffConfig) -> Self {
        let initial = config.initial_delay_ms;
        Self {
            config,
            current_delay_ms: initial,
            attempts: 0,
        }
    }

    /// Delay to wait before the next attempt; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let base_ms = self.current_delay_ms.min(self.config.max_delay_ms);
        let delay_ms = base_ms
            .saturating_add(self.jitter_ms(base_ms))
            .min(self.config.max_delay_ms);

        let next = (self.current_delay_ms as f64 * self.config.multiplier) as u64;
        self.current_delay_ms = next.min(self.config.max_delay_ms);
        self.attempts += 1;

        Duration::from_millis(delay_ms)
    }

    /// Restart the schedule after a successful attempt.
    pub fn reset(&mut self) {
        self.current_delay_ms = self.config.initial_delay_ms;
        self.attempts = 0;
    }

    /// Delays handed out since construction or the last reset.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    fn jitter_ms(&self, base_ms: u64) -> u64 {
        if !self.config.jitter {
            return 0;
        }
        let range = base_ms / 5;
        if range == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..=range)
    }
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}
