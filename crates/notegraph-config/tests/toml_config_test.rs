//! TOML loading and validation tests
//!
//! Covers the full file shape, defaults for optional values and each fatal
//! configuration error.

use notegraph_config::{
    ConfigError, ConfigLoader, Device, EmbeddingProviderType, PoolStrategy, SimilarityMode,
    VectorDistance, VectorIndexKind,
};
use std::io::Write;

const FULL_CONFIG: &str = r#"
[sources.journal]
path = "/notes/journal"
pattern = "**/*.md"

[sources.wiki]
path = "/notes/wiki"

[embedding]
provider = "ollama"
model = "nomic-embed-text"
endpoint = "http://127.0.0.1:11434"
dimension = 768
device = "cpu"
similarity_threshold = 0.75
chunk_size = 128
timeout_secs = 10
max_retries = 2

[processing]
embedding_batch_size = 16
embedding_workers = 4
strategy = "threads"
file_workers = 2
indent_width = 2
similarity_mode = "full"

[database]
path = "/var/lib/notegraph"
namespace = "notes"
database = "main"

[database.vector_index]
name = "block_vectors"
dimension = 768
distance = "euclidean"
kind = "hnsw"
"#;

#[test]
fn test_full_config_parses() {
    let config = ConfigLoader::load_from_str(FULL_CONFIG).expect("valid config");

    assert_eq!(config.sources.len(), 2);
    assert_eq!(config.sources["wiki"].pattern, "**/*.md");
    assert_eq!(config.embedding.provider, EmbeddingProviderType::Ollama);
    assert_eq!(config.embedding.device, Device::Cpu);
    assert!((config.embedding.similarity_threshold - 0.75).abs() < f32::EPSILON);
    assert_eq!(config.processing.strategy, PoolStrategy::Threads);
    assert_eq!(config.processing.similarity_mode, SimilarityMode::Full);
    assert_eq!(config.processing.indent_width, 2);
    assert_eq!(config.database.vector_index.distance, VectorDistance::Euclidean);
    assert_eq!(config.database.vector_index.kind, VectorIndexKind::Hnsw);
    assert_eq!(config.index_dimension(), 768);
}

#[test]
fn test_minimal_config_uses_defaults() {
    let config = ConfigLoader::load_from_str(
        r#"
        [sources.notes]
        path = "notes"

        [embedding]

        [database]
        "#,
    )
    .expect("valid config");

    assert_eq!(config.embedding.model, "nomic-embed-text");
    assert_eq!(config.embedding.dimension, 768);
    assert_eq!(config.processing.indent_width, 4);
    assert_eq!(config.processing.similarity_mode, SimilarityMode::Incremental);
    assert!(config.processing.embedding_workers >= 1);
    assert_eq!(config.database.vector_index.name, "block_embedding");
    assert!(!config.database.is_memory());
}

#[test]
fn test_missing_embedding_section() {
    let err = ConfigLoader::load_from_str(
        r#"
        [sources.notes]
        path = "notes"

        [database]
        "#,
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::MissingSection(ref s) if s == "embedding"));
}

#[test]
fn test_missing_sources_section() {
    let err = ConfigLoader::load_from_str("[embedding]\n[database]\n").unwrap_err();
    assert!(matches!(err, ConfigError::MissingSection(ref s) if s == "sources"));
}

#[test]
fn test_rejects_unsafe_index_name() {
    let toml = FULL_CONFIG.replace("block_vectors", "x ON block; REMOVE TABLE block");
    let err = ConfigLoader::load_from_str(&toml).unwrap_err();
    assert!(
        matches!(err, ConfigError::Invalid { ref field, .. } if field == "database.vector_index.name")
    );
}

#[test]
fn test_rejects_dimension_mismatch() {
    let toml = FULL_CONFIG.replace("dimension = 768\ndistance", "dimension = 384\ndistance");
    let err = ConfigLoader::load_from_str(&toml).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
fn test_rejects_zero_indent_width() {
    let toml = FULL_CONFIG.replace("indent_width = 2", "indent_width = 0");
    let err = ConfigLoader::load_from_str(&toml).unwrap_err();
    assert!(
        matches!(err, ConfigError::Invalid { ref field, .. } if field == "processing.indent_width")
    );
}

#[test]
fn test_malformed_toml() {
    let err = ConfigLoader::load_from_str("[sources.notes\npath = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[tokio::test]
async fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL_CONFIG.as_bytes()).unwrap();

    let config = ConfigLoader::load_from_file(file.path()).await.unwrap();
    assert_eq!(config.database.namespace, "notes");
}

#[tokio::test]
async fn test_load_missing_file() {
    let err = ConfigLoader::load_from_file("/definitely/not/here.toml")
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
