//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
///
/// All of these are fatal: a sync run never starts with a bad configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required section is absent from the file
    #[error("Missing required configuration section: [{0}]")]
    MissingSection(String),

    /// A value is present but unusable
    #[error("Invalid value for '{field}': {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: String,
        /// Human-readable explanation
        reason: String,
    },

    /// The file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected shape
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
