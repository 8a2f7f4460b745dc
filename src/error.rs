//! Domain-specific error types for the analyzer.
//!
//! Analysis problems found in the configuration tree (missing files, cycles,
//! dangling imports) are not errors: they are recorded as
//! [`Issue`](crate::graph::Issue)s and the walk always completes. The types
//! here cover the failures that do stop a command, such as an unreadable
//! settings file or a chain log that cannot be written. Command handlers
//! convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfgraphError
//! ├── Config(ConfigError): settings file loading and parsing
//! └── Report(ReportError): writing report artifacts
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the analyzer.
#[derive(Error, Debug)]
pub enum ConfgraphError {
    /// Settings-related error (I/O, TOML syntax).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Report artifact error.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Errors that arise while loading analyzer settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("IO error reading settings file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has unknown fields.
    #[error("Invalid settings in {path}: {source}")]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Underlying deserialization error.
        source: toml::de::Error,
    },

    /// The analysis root directory does not exist.
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),
}

/// Errors that arise while persisting report artifacts.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The chain log could not be written.
    #[error("Failed to write chain log {path}: {source}")]
    ChainLog {
        /// Destination path of the chain log.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// No default cache directory is available for the chain log.
    #[error("No cache directory available for the chain log; pass --chain-log")]
    NoCacheDir,

    /// The analysis could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
