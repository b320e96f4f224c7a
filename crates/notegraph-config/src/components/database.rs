//! Graph datastore settings

use serde::{Deserialize, Serialize};

/// Distance metric of the vector index
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorDistance {
    /// Cosine distance
    #[default]
    Cosine,
    /// Euclidean distance
    Euclidean,
    /// Manhattan distance
    Manhattan,
}

impl VectorDistance {
    /// SurrealQL keyword for this metric
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Cosine => "COSINE",
            Self::Euclidean => "EUCLIDEAN",
            Self::Manhattan => "MANHATTAN",
        }
    }
}

/// Vector index structure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorIndexKind {
    /// Metric tree, exact
    #[default]
    Mtree,
    /// Hierarchical navigable small world graph, approximate
    Hnsw,
}

/// `[database.vector_index]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    /// Index name
    #[serde(default = "default_index_name")]
    pub name: String,
    /// Indexed dimension; falls back to the embedding dimension
    pub dimension: Option<usize>,
    /// Distance metric
    #[serde(default)]
    pub distance: VectorDistance,
    /// Index structure
    #[serde(default)]
    pub kind: VectorIndexKind,
}

fn default_index_name() -> String {
    "block_embedding".to_string()
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            name: default_index_name(),
            dimension: None,
            distance: VectorDistance::default(),
            kind: VectorIndexKind::default(),
        }
    }
}

/// `[database]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// RocksDB directory, or `:memory:` for an in-memory store
    #[serde(default = "default_path")]
    pub path: String,
    /// SurrealDB namespace
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// SurrealDB database
    #[serde(default = "default_database")]
    pub database: String,
    /// Root user, enables authentication when set together with `password`
    pub username: Option<String>,
    /// Root password
    pub password: Option<String>,
    /// Vector index definition
    #[serde(default)]
    pub vector_index: VectorIndexConfig,
}

fn default_path() -> String {
    "notegraph.db".to_string()
}

fn default_namespace() -> String {
    "notegraph".to_string()
}

fn default_database() -> String {
    "notes".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            namespace: default_namespace(),
            database: default_database(),
            username: None,
            password: None,
            vector_index: VectorIndexConfig::default(),
        }
    }
}

impl DatabaseConfig {
    /// In-memory database, used by tests and dry runs
    pub fn in_memory() -> Self {
        Self {
            path: ":memory:".to_string(),
            ..Self::default()
        }
    }

    /// Whether this configuration selects the in-memory engine
    pub fn is_memory(&self) -> bool {
        self.path.is_empty() || self.path == ":memory:"
    }
}
