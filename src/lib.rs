//! Ticktune - runtime tuning for tick-driven simulation servers
//!
//! Two cooperating subsystems keep a busy tick loop inside its budget:
//! a concurrent TTL cache that memoizes expensive lookups, and a
//! distance-based throttle that lets entities with nobody nearby skip
//! ticks. Background maintenance and hot-reloadable settings tie the
//! two together.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;
pub mod throttle;

pub use cache::TtlCache;
pub use config::{ConfigProvider, Settings};
pub use error::{Error, Result};
pub use tasks::{spawn_cache_sweep, spawn_maintenance, MaintenanceTask};
pub use throttle::{Position, ThrottleController};
