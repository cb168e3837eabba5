//! Category Table
//!
//! Resolved per-category throttling parameters. The settings document
//! stores partial overrides; this module folds each override over the
//! default triple into complete categories ready for the hot path.

use std::collections::HashMap;

use crate::config::{CategoryOverride, CategorySettings, ThrottleSettings};

/// Fully resolved throttling parameters for one entity category.
///
/// Distances are in world units. The controller compares squared
/// distances, so both radii are kept as `f64` here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleCategory {
    /// Entities within this distance of an observer always stay active.
    pub activation_distance: f64,
    /// Observers at or beyond this distance do not count at all.
    pub max_activation_distance: f64,
    /// Ticks to skip between full updates while throttled.
    pub throttle_interval: u32,
}

impl ThrottleCategory {
    fn from_settings(settings: &CategorySettings) -> Self {
        Self {
            activation_distance: settings.activation_distance as f64,
            max_activation_distance: settings.max_activation_distance as f64,
            throttle_interval: interval_ticks(settings.throttle_interval),
        }
    }

    fn with_override(default: &CategorySettings, override_: &CategoryOverride) -> Self {
        Self {
            activation_distance: override_
                .activation_distance
                .unwrap_or(default.activation_distance) as f64,
            max_activation_distance: override_
                .max_activation_distance
                .unwrap_or(default.max_activation_distance) as f64,
            throttle_interval: interval_ticks(
                override_.throttle_interval.unwrap_or(default.throttle_interval),
            ),
        }
    }
}

/// Settings values are sanitized to be non-negative but have no upper
/// bound, so the cast to tick count saturates.
fn interval_ticks(raw: i64) -> u32 {
    raw.clamp(0, i64::from(u32::MAX)) as u32
}

/// Immutable lookup table from entity type identifier to resolved
/// category. Rebuilt wholesale on reload and shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    default: ThrottleCategory,
    overrides: HashMap<String, ThrottleCategory>,
}

impl CategoryTable {
    /// Builds the table from throttling settings.
    ///
    /// Every override inherits the fields it leaves out from the
    /// default triple, so a partial override still resolves to a
    /// complete category.
    pub fn from_settings(settings: &ThrottleSettings) -> Self {
        let overrides = settings
            .entities
            .iter()
            .map(|(category_id, override_)| {
                (
                    category_id.clone(),
                    ThrottleCategory::with_override(&settings.default, override_),
                )
            })
            .collect();
        Self {
            default: ThrottleCategory::from_settings(&settings.default),
            overrides,
        }
    }

    /// Resolves the category for `category_id`.
    ///
    /// Unknown identifiers fall back to the default category, so every
    /// lookup yields usable parameters.
    pub fn resolve(&self, category_id: &str) -> &ThrottleCategory {
        self.overrides.get(category_id).unwrap_or(&self.default)
    }

    /// The fallback category applied when no override matches.
    pub fn default_category(&self) -> &ThrottleCategory {
        &self.default
    }

    /// Number of categories carrying an explicit override.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

// == Tests ==
