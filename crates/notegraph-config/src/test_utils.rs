//! Helpers for building configurations in tests

use crate::components::{
    DatabaseConfig, EmbeddingConfig, EmbeddingProviderType, ProcessingConfig, SimilarityMode,
    SourceConfig,
};
use crate::config::NotegraphConfig;
use std::collections::BTreeMap;
use std::path::Path;

/// Configuration over one corpus root with the mock provider and an in-memory store
pub fn test_config(corpus_root: &Path, dimension: usize) -> NotegraphConfig {
    let mut sources = BTreeMap::new();
    sources.insert("notes".to_string(), SourceConfig::new(corpus_root));

    NotegraphConfig {
        sources,
        embedding: EmbeddingConfig {
            provider: EmbeddingProviderType::Mock,
            model: "mock-bag-of-words".to_string(),
            dimension,
            chunk_size: 8,
            ..EmbeddingConfig::default()
        },
        processing: ProcessingConfig {
            embedding_batch_size: 3,
            embedding_workers: 2,
            file_workers: 2,
            similarity_mode: SimilarityMode::Incremental,
            ..ProcessingConfig::default()
        },
        database: DatabaseConfig::in_memory(),
    }
}
