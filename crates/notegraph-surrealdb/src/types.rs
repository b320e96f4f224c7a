//! Connection settings and row shapes

use notegraph_config::DatabaseConfig;
use notegraph_core::{EmbeddedBlock, SourceMetadata};
use serde::{Deserialize, Serialize};

/// Connection settings for [`SurrealClient`](crate::SurrealClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurrealDbConfig {
    /// RocksDB directory, or `:memory:`
    pub path: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials; authentication is enabled when present
    pub credentials: Option<(String, String)>,
}

impl SurrealDbConfig {
    pub fn is_memory(&self) -> bool {
        self.path.is_empty() || self.path == ":memory:"
    }
}

impl From<&DatabaseConfig> for SurrealDbConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            path: config.path.clone(),
            namespace: config.namespace.clone(),
            database: config.database.clone(),
            credentials: config
                .username
                .clone()
                .zip(config.password.clone()),
        }
    }
}

/// Block as written by a bulk upsert
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BlockRow {
    pub key: String,
    pub content: String,
    pub level: i64,
    pub tags: Vec<String>,
    pub embedding: Vec<f32>,
}

impl From<&EmbeddedBlock> for BlockRow {
    fn from(block: &EmbeddedBlock) -> Self {
        Self {
            key: block.key(),
            content: block.block.content.clone(),
            level: i64::try_from(block.block.level).unwrap_or(i64::MAX),
            tags: block.block.tags.iter().cloned().collect(),
            embedding: block.embedding.clone(),
        }
    }
}

/// File attribution shared by every block of one upsert
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SourceRow {
    pub path: String,
    pub last_modified: i64,
    pub file_size: i64,
}

impl From<&SourceMetadata> for SourceRow {
    fn from(source: &SourceMetadata) -> Self {
        Self {
            path: source.path.clone(),
            last_modified: source.signature.modified_ns,
            file_size: i64::try_from(source.signature.size).unwrap_or(i64::MAX),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TagLinkRow {
    pub key: String,
    pub tag: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EmbeddingRow {
    pub key: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SourceFileRow {
    pub path: String,
    pub last_modified: i64,
    pub file_size: i64,
    pub block_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CountRow {
    pub count: i64,
}
