//! Throttle Controller
//!
//! Distance-based activity throttling. Each tick the host asks whether
//! an entity deserves a full update; the answer depends on how close
//! the nearest observer stands, with radii resolved per category from
//! the settings document.
//!
//! Decisions are taken on the tick hot path, so the controller avoids
//! locks there: the enabled flag is an atomic and the category table
//! is an `Arc` snapshot swapped wholesale on reload.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::config::ConfigProvider;
use crate::throttle::category::{CategoryTable, ThrottleCategory};
use crate::throttle::stats::ThrottleStats;

// == Position ==

/// A point in simulation space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared euclidean distance to `other`.
    ///
    /// The throttle decision compares against squared radii, so no
    /// square root is ever taken on the hot path.
    pub fn distance_squared(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

// == Controller ==

/// Decides, per entity and per tick, whether a full update should run.
///
/// The controller holds the resolved category table and the master
/// switch. Both are rebuilt from the [`ConfigProvider`] snapshot on
/// [`reload`](Self::reload); decisions already in flight keep the
/// table they resolved.
#[derive(Debug)]
pub struct ThrottleController {
    enabled: AtomicBool,
    categories: RwLock<Arc<CategoryTable>>,
    stats: ThrottleStats,
    provider: Arc<ConfigProvider>,
}

impl ThrottleController {
    /// Builds a controller from the provider's current snapshot.
    pub fn new(provider: Arc<ConfigProvider>) -> Self {
        let settings = provider.snapshot();
        Self {
            enabled: AtomicBool::new(settings.throttling.enabled),
            categories: RwLock::new(Arc::new(CategoryTable::from_settings(
                &settings.throttling,
            ))),
            stats: ThrottleStats::default(),
            provider,
        }
    }

    /// Whether throttling is currently switched on.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Flips the master switch at runtime.
    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::Relaxed);
        if previous != enabled {
            info!(enabled, "entity throttling toggled");
        }
    }

    /// Decides whether the entity should skip its full update this tick.
    ///
    /// The decision fails safe: an entity with no known position, or
    /// one with no observers anywhere near it, is throttled. Only a
    /// confirmed observer inside the activation radius keeps an entity
    /// fully active.
    ///
    /// # Arguments
    /// * `category_id` - Entity type identifier used for table lookup
    /// * `entity` - The entity's position, if one is known
    /// * `observers` - Positions of every observer to test against
    ///
    /// # Returns
    /// `true` to skip this tick's update, `false` to run it. Always
    /// `false` while the master switch is off.
    pub fn should_throttle(
        &self,
        category_id: &str,
        entity: Option<Position>,
        observers: &[Position],
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let table = self.table();
        let category = table.resolve(category_id);
        let decision = match entity {
            Some(position) => Self::decide(category, position, observers),
            // An entity nobody can place is safe to slow down.
            None => true,
        };
        if decision {
            self.stats.record_throttled();
        } else {
            self.stats.record_active();
        }
        decision
    }

    fn decide(category: &ThrottleCategory, entity: Position, observers: &[Position]) -> bool {
        let activation_sq = category.activation_distance * category.activation_distance;
        let max_sq = category.max_activation_distance * category.max_activation_distance;
        for observer in observers {
            let distance_sq = entity.distance_squared(observer);
            // Observers at or past the outer radius do not count.
            if distance_sq >= max_sq {
                continue;
            }
            if distance_sq <= activation_sq {
                return false;
            }
        }
        true
    }

    /// Ticks to skip between full updates for a throttled entity of
    /// the given category.
    pub fn throttle_interval(&self, category_id: &str) -> u32 {
        self.table().resolve(category_id).throttle_interval
    }

    /// Resolved parameters for the given category.
    pub fn category(&self, category_id: &str) -> ThrottleCategory {
        *self.table().resolve(category_id)
    }

    /// Rebuilds the category table and enabled flag from the provider's
    /// current snapshot.
    pub fn reload(&self) {
        let settings = self.provider.snapshot();
        let table = CategoryTable::from_settings(&settings.throttling);
        let overrides = table.override_count();
        *self.categories.write() = Arc::new(table);
        self.enabled
            .store(settings.throttling.enabled, Ordering::Relaxed);
        info!(
            enabled = settings.throttling.enabled,
            overrides, "throttling settings applied"
        );
    }

    /// Decision counters.
    pub fn stats(&self) -> &ThrottleStats {
        &self.stats
    }

    /// Formats a human-readable statistics report.
    pub fn report(&self) -> String {
        let snapshot = self.stats.snapshot();
        let mut out = String::new();
        let _ = writeln!(out, "=== Throttling Statistics ===");
        let _ = writeln!(out, "enabled: {}", self.is_enabled());
        let _ = writeln!(out, "overrides: {}", self.table().override_count());
        let _ = writeln!(
            out,
            "decisions: {} (throttled {}, active {})",
            snapshot.total(),
            snapshot.throttled,
            snapshot.active
        );
        let _ = writeln!(out, "throttled rate: {:.1}%", snapshot.throttled_rate());
        out
    }

    fn table(&self) -> Arc<CategoryTable> {
        self.categories.read().clone()
    }
}

// == Tests ==
