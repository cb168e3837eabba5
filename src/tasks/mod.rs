//! Background Tasks Module
//!
//! Fixed-interval maintenance jobs that run alongside the tick loop.
//!
//! # Tasks
//! - Cache sweep: reclaims expired cache entries at a configured cadence
//!
//! The scheduler itself is generic; any fallible closure can be put on
//! an interval and stopped through the same graceful-shutdown handle.

mod maintenance;
mod sweep;

pub use maintenance::{spawn_maintenance, MaintenanceTask};
pub use sweep::spawn_cache_sweep;
