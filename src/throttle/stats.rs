//! Throttle Statistics
//!
//! Lock-free counters over throttle decisions. Updated on the tick
//! hot path, so everything is relaxed atomics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Running totals over every decision the controller has made.
#[derive(Debug, Default)]
pub struct ThrottleStats {
    throttled: AtomicU64,
    active: AtomicU64,
}

impl ThrottleStats {
    pub fn record_throttled(&self) {
        self.throttled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_active(&self) {
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    /// Zeroes every counter.
    pub fn reset(&self) {
        self.throttled.store(0, Ordering::Relaxed);
        self.active.store(0, Ordering::Relaxed);
    }

    /// Captures a point-in-time copy of the counters.
    pub fn snapshot(&self) -> ThrottleStatsSnapshot {
        ThrottleStatsSnapshot {
            throttled: self.throttled.load(Ordering::Relaxed),
            active: self.active.load(Ordering::Relaxed),
        }
    }
}

/// Plain-data view of [`ThrottleStats`] at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleStatsSnapshot {
    pub throttled: u64,
    pub active: u64,
}

impl ThrottleStatsSnapshot {
    /// Total number of decisions taken.
    pub fn total(&self) -> u64 {
        self.throttled + self.active
    }

    /// Fraction of decisions that came back throttled, as a percentage.
    /// Zero when no decisions have been taken yet.
    pub fn throttled_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.throttled as f64 / total as f64 * 100.0
    }
}

// == Tests ==
