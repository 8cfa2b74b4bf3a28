//! Error types for vitrine configuration.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::de;
use vitrine_mapping::MappingError;

/// Errors that can occur when loading or using configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// The merged field declarations do not form a valid mapping.
    #[error("invalid mapping: {0}")]
    Mapping(#[from] MappingError),

    /// A search names a container the configuration does not define.
    #[error("undefined container: {0}")]
    UndefinedContainer(String),
}
