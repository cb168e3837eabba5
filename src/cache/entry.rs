//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry: the stored value plus its insertion metadata.
///
/// Entries are owned exclusively by the cache map and never handed out;
/// `get` clones the value instead. An entry is logically absent as soon as
/// its age exceeds its TTL, whether or not it has been physically removed
/// yet (lazy expiration).
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Monotonic instant at which the entry was (re)inserted
    inserted_at: Instant,
    /// Insertion sequence number; breaks FIFO ties when instants collide
    seq: u64,
    /// How long the entry stays readable after insertion
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current instant.
    ///
    /// `seq` is handed out by the owning cache and increases with every
    /// insertion, so eviction has a total order even when two entries are
    /// created within the clock's resolution.
    pub(crate) fn new(value: V, seq: u64, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            seq,
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry's age exceeds its TTL.
    ///
    /// Boundary condition: an entry is expired only once the elapsed time is
    /// strictly greater than the TTL. A zero TTL therefore expires on the
    /// first read after any time has passed at all.
    pub fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }

    // == Remaining TTL ==
    /// Returns the time left until the entry expires.
    ///
    /// Useful for debugging and statistics; returns zero once expired.
    pub fn remaining_ttl(&self) -> Duration {
        self.ttl.saturating_sub(self.inserted_at.elapsed())
    }

    /// Sort key for oldest-insertion-first eviction.
    pub(crate) fn insertion_order(&self) -> (Instant, u64) {
        (self.inserted_at, self.seq)
    }
}
