//! Connection-establishment latency snapshot.

use serde::Serialize;

/// Distribution of connect latencies (milliseconds) since the previous
/// snapshot.
///
/// An empty window reports zeros everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LifecycleStats {
    /// Mean over every sample since the last snapshot.
    pub average: f64,
    /// Median of the recent window.
    pub p50: u64,
    /// 95th percentile of the recent window.
    pub p95: u64,
    /// 99th percentile of the recent window.
    pub p99: u64,
    /// Fastest connect since the last snapshot.
    pub min: u64,
    /// Slowest connect since the last snapshot.
    pub max: u64,
    /// Connects recorded since the last snapshot.
    pub sample_count: u64,
}

impl LifecycleStats {
    /// True when no connect completed since the last snapshot.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}
