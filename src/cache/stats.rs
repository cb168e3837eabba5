//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! sweep activity.
//!
//! Counters are lock-free atomics so the hot path can record through a
//! shared reference and the report can be assembled without pausing
//! traffic.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};

// == Cache Stats ==
/// Lock-free cache performance counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Successful cache retrievals
    hits: AtomicU64,
    /// Failed cache retrievals (key missing or expired)
    misses: AtomicU64,
    /// Entries removed by size-bound eviction
    evictions: AtomicU64,
    /// Completed background sweep passes
    sweeps: AtomicU64,
    /// Entries removed across all sweeps
    swept_entries: AtomicU64,
    /// Entries removed by the most recent sweep
    last_sweep_removed: AtomicU64,
    /// Wall-clock time of the most recent sweep, epoch millis, 0 = never
    last_sweep_at_ms: AtomicI64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Sweep ==
    /// Records one completed sweep pass and how many entries it removed.
    pub fn record_sweep(&self, removed: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.swept_entries.fetch_add(removed as u64, Ordering::Relaxed);
        self.last_sweep_removed.store(removed as u64, Ordering::Relaxed);
        self.last_sweep_at_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    // == Reset ==
    /// Zeroes every counter; used by the global invalidation signal.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.sweeps.store(0, Ordering::Relaxed);
        self.swept_entries.store(0, Ordering::Relaxed);
        self.last_sweep_removed.store(0, Ordering::Relaxed);
        self.last_sweep_at_ms.store(0, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Returns a plain copy of the counters for reporting.
    ///
    /// Each counter is loaded independently; under concurrent updates the
    /// snapshot is advisory, not a consistent cut.
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        let at_ms = self.last_sweep_at_ms.load(Ordering::Relaxed);
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            swept_entries: self.swept_entries.load(Ordering::Relaxed),
            last_sweep_removed: self.last_sweep_removed.load(Ordering::Relaxed),
            last_sweep_at: (at_ms != 0).then(|| DateTime::from_timestamp_millis(at_ms)).flatten(),
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub sweeps: u64,
    pub swept_entries: u64,
    pub last_sweep_removed: u64,
    pub last_sweep_at: Option<DateTime<Utc>>,
}

impl CacheStatsSnapshot {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
