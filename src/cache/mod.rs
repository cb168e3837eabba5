//! Cache Module
//!
//! Provides concurrent in-memory caching with TTL expiration and
//! oldest-insertion-first bounded eviction.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::TtlCache;
