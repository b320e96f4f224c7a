//! Loading configuration from TOML

use crate::config::{NotegraphConfig, RawConfig};
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use tracing::debug;

/// Reads and validates configuration files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file
    pub async fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<NotegraphConfig> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded config file {}", path.display());
        Self::load_from_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn load_from_str(contents: &str) -> ConfigResult<NotegraphConfig> {
        let raw: RawConfig = toml::from_str(contents)?;
        NotegraphConfig::try_from(raw)
    }
}
