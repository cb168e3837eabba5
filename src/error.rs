//! Error types for the optimization core
//!
//! Provides unified error handling using thiserror.
//!
//! Nothing on the hot path produces an error: cache lookups return `Option`
//! and throttle decisions return `bool`. Errors are confined to the settings
//! layer and to maintenance cycles, where they are logged and degrade the
//! affected feature instead of propagating into the host.

use std::path::PathBuf;

use thiserror::Error;

// == Core Error Enum ==
/// Unified error type for the optimization core.
#[derive(Error, Debug)]
pub enum Error {
    /// Settings file could not be read
    #[error("failed to read settings file {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings document could not be parsed
    #[error("failed to parse settings document: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// A maintenance cycle reported a failure
    ///
    /// Captured and logged by the scheduler; never stops the schedule.
    #[error("maintenance cycle failed: {0}")]
    Maintenance(String),
}

// == Result Type Alias ==
/// Convenience Result type for the optimization core.
pub type Result<T> = std::result::Result<T, Error>;
