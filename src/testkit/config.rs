//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::config::BackoffConfig;
use crate::domain::{ConnectionSettings, TargetAddress};

/// Target used by mock transports. Nothing listens there.
pub fn target() -> TargetAddress {
    TargetAddress::new("test.invalid", 9)
}

/// Settings with Nagle disabled and no other options.
pub fn settings() -> ConnectionSettings {
    ConnectionSettings::default()
}

/// Zero-delay backoff so retry loops never wait in tests.
pub fn backoff() -> BackoffConfig {
    BackoffConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        multiplier: 1.0,
        jitter: false,
    }
}
