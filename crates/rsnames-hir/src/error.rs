//! Error types of the library's fallible entry points.

use std::path::PathBuf;

use thiserror::Error;

/// Error produced while loading an [`AnalysisConfig`](crate::config::AnalysisConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML or has the wrong shape.
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    /// A `[cfg] options` entry is not a valid predicate atom.
    #[error("invalid cfg option `{0}`")]
    InvalidCfgOption(String),
}
