//! Top-level configuration and validation

use crate::components::{DatabaseConfig, EmbeddingConfig, ProcessingConfig, SourceConfig};
use crate::error::{ConfigError, ConfigResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

/// Whether `name` is safe to render into a schema statement
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// File shape before required sections are checked
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawConfig {
    #[serde(default)]
    sources: BTreeMap<String, SourceConfig>,
    embedding: Option<EmbeddingConfig>,
    #[serde(default)]
    processing: ProcessingConfig,
    database: Option<DatabaseConfig>,
}

/// Complete, validated configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotegraphConfig {
    /// Named corpus roots
    pub sources: BTreeMap<String, SourceConfig>,
    /// Embedding provider settings
    pub embedding: EmbeddingConfig,
    /// Processing settings
    pub processing: ProcessingConfig,
    /// Datastore settings
    pub database: DatabaseConfig,
}

impl TryFrom<RawConfig> for NotegraphConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> ConfigResult<Self> {
        if raw.sources.is_empty() {
            return Err(ConfigError::MissingSection("sources".to_string()));
        }
        let embedding = raw
            .embedding
            .ok_or_else(|| ConfigError::MissingSection("embedding".to_string()))?;
        let database = raw
            .database
            .ok_or_else(|| ConfigError::MissingSection("database".to_string()))?;

        let config = Self {
            sources: raw.sources,
            embedding,
            processing: raw.processing,
            database,
        };
        config.validate()?;
        Ok(config)
    }
}

impl NotegraphConfig {
    /// Dimension the vector index is declared with
    pub fn index_dimension(&self) -> usize {
        self.database
            .vector_index
            .dimension
            .unwrap_or(self.embedding.dimension)
    }

    /// Check every value a run depends on
    pub fn validate(&self) -> ConfigResult<()> {
        let embedding = &self.embedding;
        if embedding.dimension == 0 {
            return Err(ConfigError::invalid("embedding.dimension", "must be positive"));
        }
        if embedding.chunk_size == 0 {
            return Err(ConfigError::invalid("embedding.chunk_size", "must be positive"));
        }
        if !(-1.0..=1.0).contains(&embedding.similarity_threshold) {
            return Err(ConfigError::invalid(
                "embedding.similarity_threshold",
                "must lie within [-1, 1]",
            ));
        }

        let processing = &self.processing;
        for (field, value) in [
            ("processing.embedding_batch_size", processing.embedding_batch_size),
            ("processing.embedding_workers", processing.embedding_workers),
            ("processing.file_workers", processing.file_workers),
            ("processing.indent_width", processing.indent_width),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be positive"));
            }
        }

        let database = &self.database;
        for (field, value) in [
            ("database.namespace", database.namespace.as_str()),
            ("database.database", database.database.as_str()),
            ("database.vector_index.name", database.vector_index.name.as_str()),
        ] {
            if !is_identifier(value) {
                return Err(ConfigError::invalid(
                    field,
                    format!("'{value}' is not a plain identifier"),
                ));
            }
        }
        if database.username.is_some() != database.password.is_some() {
            return Err(ConfigError::invalid(
                "database.username",
                "username and password must be set together",
            ));
        }
        if self.index_dimension() != embedding.dimension {
            return Err(ConfigError::invalid(
                "database.vector_index.dimension",
                format!(
                    "index dimension {} does not match embedding dimension {}",
                    self.index_dimension(),
                    embedding.dimension
                ),
            ));
        }

        for (name, source) in &self.sources {
            if source.pattern.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("sources.{name}.pattern"),
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }
}
