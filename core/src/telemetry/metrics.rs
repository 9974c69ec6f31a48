use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Counters gathered while sweeping a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepCounts {
    /// Record/angle pairs whose radius was computed.
    pub evaluated: usize,
    /// Points dropped by the cutoff filter.
    pub cut: usize,
    /// Records excluded because their shape code is unknown.
    pub rejected: usize,
}

/// Shared recorder; angles may report from several threads.
pub struct SweepMetrics {
    inner: Mutex<SweepCounts>,
}

impl SweepMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SweepCounts::default()),
        }
    }

    pub fn record_evaluated(&self, count: usize) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.evaluated += count;
        }
    }

    pub fn record_cut(&self, count: usize) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.cut += count;
        }
    }

    pub fn record_rejected(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.rejected += 1;
        }
    }

    pub fn snapshot(&self) -> SweepCounts {
        if let Ok(counts) = self.inner.lock() {
            *counts
        } else {
            SweepCounts::default()
        }
    }
}

impl Default for SweepMetrics {
    fn default() -> Self {
        Self::new()
    }
}
