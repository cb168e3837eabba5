//! Cache Store Module
//!
//! Main cache engine combining a sharded concurrent map with TTL expiration
//! and oldest-insertion-first eviction.
//!
//! Expiration is enforced twice: lazily on every read (an expired entry can
//! never be observed, whatever the sweep timing) and in bulk by the periodic
//! background sweep (memory is reclaimed even for keys that are never read
//! again). Eviction on insert is the backstop that keeps the entry count
//! bounded when insertion bursts outpace the sweep cadence.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats, CacheStatsSnapshot};
use crate::config::CacheSettings;

// == TTL Cache ==
/// Concurrent key-value cache with per-entry TTL and a hard size ceiling.
///
/// All operations take `&self`; the cache is meant to be shared via `Arc`
/// and called from the simulation hot path and the maintenance task at the
/// same time without any external locking. The map is sharded, so a sweep
/// only ever locks one shard at a time and never stalls unrelated keys.
///
/// The size ceiling is restored rather than strictly maintained: a put may
/// transiently overshoot `capacity` before the next eviction pass brings
/// the count back down.
pub struct TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Sharded key-value storage
    entries: DashMap<String, CacheEntry<V>>,
    /// Hands out insertion sequence numbers
    next_seq: AtomicU64,
    /// Performance statistics
    stats: CacheStats,
    /// Hard ceiling on the number of entries
    capacity: usize,
    /// TTL applied by `put`
    default_ttl: Duration,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a new cache with the given size ceiling and default TTL.
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            next_seq: AtomicU64::new(0),
            stats: CacheStats::new(),
            capacity,
            default_ttl,
        }
    }

    /// Creates a cache from the `cache` section of the settings document.
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.capacity(), settings.default_ttl())
    }

    // == Put ==
    /// Inserts or overwrites a key with the default TTL.
    pub fn put(&self, key: impl Into<String>, value: V) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    /// Inserts or overwrites a key with an explicit TTL.
    ///
    /// If the cache is at or above its ceiling immediately before the
    /// insertion, the oldest entries are synchronously evicted first (see
    /// [`Self::evict_oldest`]). Overwriting refreshes both the TTL and the
    /// entry's insertion order.
    pub fn put_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(key.into(), CacheEntry::new(value, seq, ttl));
    }

    // == Get ==
    /// Retrieves a value by key, treating expired entries as absent.
    ///
    /// An expired entry is removed on the spot (lazy deletion on read), so a
    /// reader can never observe a value past its TTL regardless of when the
    /// background sweep last ran.
    pub fn get(&self, key: &str) -> Option<V> {
        let live = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            Some(_) => None, // expired; removed below once the shard guard is released
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        match live {
            Some(value) => {
                self.stats.record_hit();
                Some(value)
            }
            None => {
                // The predicate re-checks expiry so a concurrent overwrite
                // that refreshed the key in the meantime survives.
                self.entries.remove_if(key, |_, entry| entry.is_expired());
                self.stats.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// Same lazy-expiration semantics as [`Self::get`] without cloning the
    /// value. Does not touch the hit/miss counters.
    pub fn contains_key(&self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired());
            false
        } else {
            true
        }
    }

    // == Remove ==
    /// Removes a key unconditionally, ignoring expiration, and returns the
    /// stored value if one was present.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    // == Clear ==
    /// Drops all entries unconditionally.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Handles the global invalidation signal: drops every entry and resets
    /// the statistics counters. Safe to call concurrently with any hot-path
    /// operation.
    pub fn invalidate_all(&self) {
        info!(size = self.entries.len(), "invalidating all cache entries");
        self.entries.clear();
        self.stats.reset();
    }

    // == Size ==
    /// Current physical entry count. May transiently include expired
    /// entries that no sweep or read has removed yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured size ceiling.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The TTL applied by [`Self::put`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Eviction ==
    /// Removes the oldest entries by insertion order.
    ///
    /// The batch is one tenth of the capacity, widened to the current
    /// overshoot when the count has drifted further past the ceiling, so a
    /// single pass always restores `len <= capacity` for the insert that
    /// follows. The scan snapshots `(key, insertion order)` pairs shard by
    /// shard; at the reference scale (removing 1,000 of 10,000 entries,
    /// rarely) the sort stays well inside a tick budget.
    fn evict_oldest(&self) {
        let len = self.entries.len();
        let batch = (self.capacity / 10).max((len + 1).saturating_sub(self.capacity));

        let mut by_age: Vec<(String, (Instant, u64))> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().insertion_order()))
            .collect();
        by_age.sort_unstable_by_key(|&(_, order)| order);

        let mut removed = 0usize;
        for (key, _) in by_age.into_iter().take(batch) {
            if self.entries.remove(&key).is_some() {
                self.stats.record_eviction();
                removed += 1;
            }
        }

        debug!(
            removed,
            size = self.entries.len(),
            capacity = self.capacity,
            "evicted oldest entries"
        );
    }

    // == Sweep ==
    /// Removes every expired entry and returns how many were dropped.
    ///
    /// Called by the maintenance task; walks the map shard by shard so
    /// hot-path calls on other shards proceed during the pass.
    pub fn sweep_expired(&self) -> usize {
        let mut removed = 0usize;
        self.entries.retain(|_, entry| {
            if entry.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });

        self.stats.record_sweep(removed);
        removed
    }

    // == Stats ==
    /// Returns a point-in-time copy of the performance counters.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Renders a human-readable statistics block.
    ///
    /// Assembled from atomic loads and the live entry count; never pauses
    /// hot-path traffic.
    pub fn report(&self) -> String {
        let stats = self.stats.snapshot();
        let mut out = String::new();
        let _ = writeln!(out, "=== Cache Statistics ===");
        let _ = writeln!(out, "size: {}/{}", self.entries.len(), self.capacity);
        let _ = writeln!(
            out,
            "hits: {}  misses: {}  hit rate: {:.1}%",
            stats.hits,
            stats.misses,
            stats.hit_rate() * 100.0
        );
        let _ = writeln!(out, "evictions: {}", stats.evictions);
        match stats.last_sweep_at {
            Some(at) => {
                let _ = writeln!(
                    out,
                    "sweeps: {} (last at {}, removed {}; {} total)",
                    stats.sweeps,
                    at.format("%Y-%m-%d %H:%M:%S UTC"),
                    stats.last_sweep_removed,
                    stats.swept_entries
                );
            }
            None => {
                let _ = writeln!(out, "sweeps: none yet");
            }
        }
        out
    }
}

impl<V> std::fmt::Debug for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("size", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
