//! Connect latency accumulator.
//!
//! Every connect completion records one sample and every stats poll takes a
//! snapshot and resets. Both go through the same lock, so a sample lands in
//! exactly one snapshot no matter how the two interleave.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

use crate::domain::LifecycleStats;

/// Maximum number of samples retained for percentile calculation.
pub const DEFAULT_WINDOW: usize = 1000;

/// Latency tracker with snapshot-and-reset semantics.
///
/// Count, sum, min and max are exact over every sample since the last reset.
/// Percentiles are computed over the most recent `window` samples.
pub struct LatencyTracker {
    inner: Mutex<Samples>,
}

struct Samples {
    recent: VecDeque<u64>,
    window: usize,
    count: u64,
    sum: u128,
    min: u64,
    max: u64,
}

impl Samples {
    fn new(window: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(window.min(DEFAULT_WINDOW)),
            window,
            count: 0,
            sum: 0,
            min: u64::MAX,
            max: 0,
        }
    }

    fn push(&mut self, millis: u64) {
        self.recent.push_back(millis);
        while self.recent.len() > self.window {
            self.recent.pop_front();
        }
        self.count += 1;
        self.sum += u128::from(millis);
        self.min = self.min.min(millis);
        self.max = self.max.max(millis);
    }

    fn stats(&self) -> LifecycleStats {
        if self.count == 0 {
            return LifecycleStats::default();
        }

        let mut sorted: Vec<u64> = self.recent.iter().copied().collect();
        sorted.sort_unstable();

        LifecycleStats {
            average: self.sum as f64 / self.count as f64,
            p50: percentile(&sorted, 0.50),
            p95: percentile(&sorted, 0.95),
            p99: percentile(&sorted, 0.99),
            min: self.min,
            max: self.max,
            sample_count: self.count,
        }
    }

    fn clear(&mut self) {
        self.recent.clear();
        self.count = 0;
        self.sum = 0;
        self.min = u64::MAX;
        self.max = 0;
    }
}

/// Value at percentile `p` (0.0 to 1.0) of an ascending slice.
fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }

    let index = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[index.min(sorted.len() - 1)]
}

impl LatencyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Create a tracker that keeps at most `window` samples for percentiles.
    #[must_use]
    pub fn with_window(window: usize) -> Self {
        Self {
            inner: Mutex::new(Samples::new(window.max(1))),
        }
    }

    /// Record one latency sample in milliseconds.
    pub fn record(&self, millis: u64) {
        self.inner.lock().push(millis);
    }

    /// Record one latency sample, truncated to whole milliseconds.
    pub fn record_duration(&self, elapsed: Duration) {
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.record(millis);
    }

    /// Current distribution without resetting.
    #[must_use]
    pub fn peek(&self) -> LifecycleStats {
        self.inner.lock().stats()
    }

    /// Current distribution, then reset to empty, atomically.
    pub fn snapshot_and_reset(&self) -> LifecycleStats {
        let mut samples = self.inner.lock();
        let stats = samples.stats();
        samples.clear();
        stats
    }

    /// Number of samples recorded since the last reset.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.inner.lock().count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new()
    }
}
