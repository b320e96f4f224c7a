//! Order-preserving batch embedder
//!
//! Texts are split into chunks of `chunk_size`, and each chunk into batches
//! of `batch_size`. All batches of a chunk are queued on the worker pool
//! before any reply is awaited; replies are then collected in submission
//! order, so output position `i` always belongs to input text `i`.
//!
//! The pool is started once and held until [`BatchEmbedder::shutdown`],
//! trading the memory of idle workers for a single startup per run.

use crate::providers::create_provider;
use crate::worker_pool::EmbeddingWorkerPool;
use async_trait::async_trait;
use notegraph_config::{NotegraphConfig, PoolStrategy};
use notegraph_core::{BatchEmbedder, EmbeddingError, EmbeddingProvider, EmbeddingResult};
use std::sync::Arc;
use tracing::debug;

/// Sizing of the embedder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatcherSettings {
    pub chunk_size: usize,
    pub batch_size: usize,
    pub workers: usize,
    pub strategy: PoolStrategy,
}

impl BatcherSettings {
    pub fn from_config(config: &NotegraphConfig) -> Self {
        Self {
            chunk_size: config.embedding.chunk_size,
            batch_size: config.processing.embedding_batch_size,
            workers: config.processing.embedding_workers,
            strategy: config.processing.strategy,
        }
    }
}

impl Default for BatcherSettings {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            batch_size: 32,
            workers: 4,
            strategy: PoolStrategy::Tasks,
        }
    }
}

#[derive(Debug)]
pub struct EmbeddingBatcher {
    pool: EmbeddingWorkerPool,
    settings: BatcherSettings,
    dimensions: usize,
}

impl EmbeddingBatcher {
    /// Start the worker pool around `provider`
    pub fn start(
        provider: Arc<dyn EmbeddingProvider>,
        settings: BatcherSettings,
    ) -> EmbeddingResult<Self> {
        let settings = BatcherSettings {
            chunk_size: settings.chunk_size.max(1),
            batch_size: settings.batch_size.max(1),
            ..settings
        };
        let dimensions = provider.dimensions();
        let pool = EmbeddingWorkerPool::start(provider, settings.workers, settings.strategy)?;
        Ok(Self {
            pool,
            settings,
            dimensions,
        })
    }

    /// Build the configured provider and start the pool
    pub fn from_config(config: &NotegraphConfig) -> EmbeddingResult<Self> {
        let provider = create_provider(&config.embedding)?;
        Self::start(provider, BatcherSettings::from_config(config))
    }

    pub fn settings(&self) -> BatcherSettings {
        self.settings
    }

    fn validate(&self, expected: usize, vectors: &[Vec<f32>]) -> EmbeddingResult<()> {
        if vectors.len() != expected {
            return Err(EmbeddingError::CountMismatch {
                expected,
                actual: vectors.len(),
            });
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: bad.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BatchEmbedder for EmbeddingBatcher {
    async fn embed(&self, texts: Vec<String>) -> EmbeddingResult<Vec<Vec<f32>>> {
        let mut output = Vec::with_capacity(texts.len());

        for (chunk_index, chunk) in texts.chunks(self.settings.chunk_size).enumerate() {
            let mut pending = Vec::new();
            for batch in chunk.chunks(self.settings.batch_size) {
                let receiver = self.pool.submit(batch.to_vec()).await?;
                pending.push((batch.len(), receiver));
            }
            debug!(
                "Chunk {}: {} texts in {} batches",
                chunk_index,
                chunk.len(),
                pending.len()
            );

            for (expected, receiver) in pending {
                let vectors = receiver.await.map_err(|_| {
                    EmbeddingError::WorkerFailed("worker dropped the reply channel".to_string())
                })??;
                self.validate(expected, &vectors)?;
                output.extend(vectors);
            }
        }

        Ok(output)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn shutdown(&self) -> EmbeddingResult<()> {
        self.pool.shutdown().await
    }
}
