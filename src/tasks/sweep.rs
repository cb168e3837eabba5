//! Cache Sweep Task
//!
//! Periodic expiration sweep for a shared TTL cache. Lazy expiration
//! already hides expired entries from readers; the sweep exists to
//! reclaim the memory of entries nobody ever reads again.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::tasks::{spawn_maintenance, MaintenanceTask};

/// Spawns the periodic expiration sweep over `cache`.
///
/// # Arguments
/// * `cache` - Shared cache to sweep
/// * `interval` - Time between sweep passes
///
/// # Returns
/// The task handle, used to stop the sweep during shutdown.
pub fn spawn_cache_sweep<V>(cache: Arc<TtlCache<V>>, interval: Duration) -> MaintenanceTask
where
    V: Clone + Send + Sync + 'static,
{
    spawn_maintenance("cache-sweep", interval, move || {
        let removed = cache.sweep_expired();
        if removed > 0 {
            info!(removed, size = cache.len(), "expiration sweep reclaimed entries");
        } else {
            debug!("expiration sweep found nothing to reclaim");
        }
        Ok(())
    })
}

// == Tests ==
