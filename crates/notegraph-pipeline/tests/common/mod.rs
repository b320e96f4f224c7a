//! Shared fixtures for pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use notegraph_config::{test_config, NotegraphConfig};
use notegraph_core::memory::InMemoryGraphStore;
use notegraph_core::{BatchEmbedder, EmbeddingError, EmbeddingProvider, EmbeddingResult};
use notegraph_enrichment::{BatcherSettings, EmbeddingBatcher, MockEmbeddingProvider};
use notegraph_pipeline::SyncOrchestrator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const DIM: usize = 256;

/// Temporary note corpus
pub struct Corpus {
    pub dir: TempDir,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, text).expect("Failed to write note");
        path
    }

    pub fn remove(&self, name: &str) {
        std::fs::remove_file(self.dir.path().join(name)).expect("Failed to remove note");
    }

    pub fn key(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }

    pub fn config(&self) -> NotegraphConfig {
        test_config(self.root(), DIM)
    }
}

/// Mock provider that fails every batch containing `POISON`
pub struct PoisonAwareProvider {
    inner: MockEmbeddingProvider,
}

impl PoisonAwareProvider {
    pub fn new() -> Self {
        Self {
            inner: MockEmbeddingProvider::new(DIM),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for PoisonAwareProvider {
    async fn encode(&self, batch: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if batch.iter().any(|t| t.contains("POISON")) {
            return Err(EmbeddingError::Provider {
                provider: "poison".to_string(),
                message: "refused".to_string(),
            });
        }
        self.inner.encode(batch).await
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn model_name(&self) -> &str {
        "poison-aware"
    }
}

pub fn embedder_with(
    provider: Arc<dyn EmbeddingProvider>,
    config: &NotegraphConfig,
) -> Arc<EmbeddingBatcher> {
    Arc::new(
        EmbeddingBatcher::start(provider, BatcherSettings::from_config(config))
            .expect("Failed to start embedder"),
    )
}

pub fn mock_embedder(config: &NotegraphConfig) -> Arc<EmbeddingBatcher> {
    embedder_with(Arc::new(MockEmbeddingProvider::new(DIM)), config)
}

/// Batch embedder that drops the last vector of every call
pub struct ShortEmbedder;

#[async_trait]
impl BatchEmbedder for ShortEmbedder {
    async fn embed(&self, texts: Vec<String>) -> EmbeddingResult<Vec<Vec<f32>>> {
        let mut vectors = vec![vec![1.0; DIM]; texts.len()];
        vectors.pop();
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    async fn shutdown(&self) -> EmbeddingResult<()> {
        Ok(())
    }
}

/// Orchestrator over an in-memory store and the mock provider
pub struct Harness {
    pub store: Arc<InMemoryGraphStore>,
    pub embedder: Arc<EmbeddingBatcher>,
    pub orchestrator: SyncOrchestrator,
}

impl Harness {
    pub fn new(config: &NotegraphConfig) -> Self {
        Self::with_embedder(config, mock_embedder(config))
    }

    pub fn with_embedder(config: &NotegraphConfig, embedder: Arc<EmbeddingBatcher>) -> Self {
        let store = Arc::new(InMemoryGraphStore::new());
        let orchestrator = SyncOrchestrator::new(config, store.clone(), embedder.clone());
        Self {
            store,
            embedder,
            orchestrator,
        }
    }

    pub async fn shutdown(&self) {
        self.embedder.shutdown().await.expect("Failed to shut down embedder");
    }
}
