//! Configuration Module
//!
//! Handles loading, validating, and providing access to the settings
//! document shared by the cache and the throttling controller. Settings
//! come from a YAML file with kebab-case keys; every missing or invalid
//! value falls back to a documented default so the host always comes up.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

// == Defaults ==

const DEFAULT_CACHE_MAX_SIZE: i64 = 10_000;
const DEFAULT_CACHE_TTL_SECS: i64 = 30 * 60;
const DEFAULT_SWEEP_INTERVAL_SECS: i64 = 5 * 60;

const DEFAULT_ACTIVATION_DISTANCE: i64 = 32;
const DEFAULT_MAX_ACTIVATION_DISTANCE: i64 = 64;
const DEFAULT_THROTTLE_INTERVAL: i64 = 20;

// == Settings Document ==

/// Root of the settings document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub cache: CacheSettings,
    pub throttling: ThrottleSettings,
}

impl Settings {
    /// Parses a YAML document into sanitized settings.
    ///
    /// An empty document yields the defaults; unknown keys are ignored.
    ///
    /// # Arguments
    /// * `text` - Raw YAML text
    ///
    /// # Returns
    /// * `Ok(Settings)` with every value normalized
    /// * `Err` if the document is not valid YAML for this shape
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Settings = serde_yaml::from_str(text)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Clamps out-of-range values back to safe ones.
    fn sanitize(&mut self) {
        self.cache.sanitize();
        self.throttling.sanitize();
    }
}

/// Cache sizing and expiration settings.
///
/// Raw values are plain integers so that a hand-edited file can hold
/// anything; `sanitize` normalizes them and the typed accessors below
/// are what the rest of the crate consumes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheSettings {
    /// Hard ceiling on the number of live entries.
    pub max_size: i64,
    /// Lifetime for entries inserted without an explicit TTL, in seconds.
    pub default_ttl_secs: i64,
    /// Cadence of the background expiration sweep, in seconds.
    pub sweep_interval_secs: i64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_CACHE_MAX_SIZE,
            default_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl CacheSettings {
    fn sanitize(&mut self) {
        if self.max_size <= 0 {
            warn!(max_size = self.max_size, "invalid cache max-size, using default");
            self.max_size = DEFAULT_CACHE_MAX_SIZE;
        }
        if self.default_ttl_secs < 0 {
            warn!(
                default_ttl_secs = self.default_ttl_secs,
                "negative cache TTL, clamping to zero"
            );
            self.default_ttl_secs = 0;
        }
        if self.sweep_interval_secs <= 0 {
            warn!(
                sweep_interval_secs = self.sweep_interval_secs,
                "invalid sweep interval, using default"
            );
            self.sweep_interval_secs = DEFAULT_SWEEP_INTERVAL_SECS;
        }
    }

    /// Entry ceiling as a count.
    pub fn capacity(&self) -> usize {
        self.max_size as usize
    }

    /// Default entry lifetime.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs as u64)
    }

    /// Background sweep cadence.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs as u64)
    }
}

/// Entity throttling settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ThrottleSettings {
    /// Master switch; when off every throttle decision is "do not throttle".
    pub enabled: bool,
    /// Fallback values for categories without an override.
    pub default: CategorySettings,
    /// Per-category overrides, keyed by entity type identifier.
    pub entities: BTreeMap<String, CategoryOverride>,
}

impl ThrottleSettings {
    fn sanitize(&mut self) {
        self.default.sanitize();
        for override_ in self.entities.values_mut() {
            override_.sanitize();
        }
    }
}

/// A complete throttling triple for one entity category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CategorySettings {
    /// Distance within which an entity always stays active, in blocks.
    pub activation_distance: i64,
    /// Distance beyond which an observer no longer counts, in blocks.
    pub max_activation_distance: i64,
    /// Ticks to skip between updates while throttled.
    pub throttle_interval: i64,
}

impl Default for CategorySettings {
    fn default() -> Self {
        Self {
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            max_activation_distance: DEFAULT_MAX_ACTIVATION_DISTANCE,
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
        }
    }
}

impl CategorySettings {
    fn sanitize(&mut self) {
        self.activation_distance = self.activation_distance.max(0);
        self.max_activation_distance = self.max_activation_distance.max(0);
        self.throttle_interval = self.throttle_interval.max(0);
    }
}

/// A partial triple; absent fields inherit from the default category.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CategoryOverride {
    pub activation_distance: Option<i64>,
    pub max_activation_distance: Option<i64>,
    pub throttle_interval: Option<i64>,
}

impl CategoryOverride {
    fn sanitize(&mut self) {
        self.activation_distance = self.activation_distance.map(|value| value.max(0));
        self.max_activation_distance = self.max_activation_distance.map(|value| value.max(0));
        self.throttle_interval = self.throttle_interval.map(|value| value.max(0));
    }
}

// == Config Provider ==

/// Owns the authoritative settings snapshot and swaps it wholesale on
/// reload, so readers never observe a partially applied document.
#[derive(Debug)]
pub struct ConfigProvider {
    /// Backing file; `None` when built from in-memory settings.
    path: Option<PathBuf>,
    current: RwLock<Arc<Settings>>,
}

impl ConfigProvider {
    /// Loads the settings document at `path`.
    ///
    /// Never fails: a missing file is announced at info level, a
    /// malformed one at warn level, and either case falls back to the
    /// defaults so startup always succeeds.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match Self::read_file(&path) {
            Ok(settings) => {
                info!(path = %path.display(), "settings loaded");
                settings
            }
            Err(Error::ConfigIo { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                info!(path = %path.display(), "settings file not found, using defaults");
                Settings::default()
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to load settings, using defaults");
                Settings::default()
            }
        };
        Self {
            path: Some(path),
            current: RwLock::new(Arc::new(settings)),
        }
    }

    /// Wraps an in-memory settings document. `reload` becomes a no-op.
    pub fn from_settings(mut settings: Settings) -> Self {
        settings.sanitize();
        Self {
            path: None,
            current: RwLock::new(Arc::new(settings)),
        }
    }

    /// Returns the current snapshot. The lock is held only long enough
    /// to clone the `Arc`, so callers can hold the snapshot as long as
    /// they like.
    pub fn snapshot(&self) -> Arc<Settings> {
        self.current.read().clone()
    }

    /// Re-reads the backing file and swaps the snapshot.
    ///
    /// # Returns
    /// * `Ok(())` once the new document is in place
    /// * `Err` if the file is unreadable or malformed; the previous
    ///   snapshot stays in effect
    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            debug!("settings have no backing file, nothing to reload");
            return Ok(());
        };
        let settings = Self::read_file(path)?;
        *self.current.write() = Arc::new(settings);
        info!(path = %path.display(), "settings reloaded");
        Ok(())
    }

    fn read_file(path: &Path) -> Result<Settings> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Settings::from_yaml(&text)
    }
}

// == Tests ==
