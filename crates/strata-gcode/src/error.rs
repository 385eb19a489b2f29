//! Error types for move planning and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from configuration loading and validation.
#[derive(Error, Debug)]
pub enum GcodeError {
    /// A configuration value is out of range.
    #[error("invalid printer config: {0}")]
    InvalidConfig(String),

    /// The configuration file is not valid TOML for a printer config.
    #[error("failed to parse printer config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, GcodeError>;
