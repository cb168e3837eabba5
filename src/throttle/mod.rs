//! Entity Throttling Module
//!
//! Decides, per entity and per tick, whether a full simulation update
//! is worth running based on how far away the nearest observer is.
//! Entities with nobody nearby skip ticks; anything close to an
//! observer stays fully active.
//!
//! # Components
//! - `category`: per-category parameter table resolved from settings
//! - `controller`: the decision engine and its reload path
//! - `stats`: lock-free decision counters

mod category;
mod controller;
mod stats;


pub use category::{CategoryTable, ThrottleCategory};
pub use controller::{Position, ThrottleController};
pub use stats::{ThrottleStats, ThrottleStatsSnapshot};
