//! Store and embedder lifetime for one CLI invocation

use anyhow::{Context, Result};
use notegraph_config::NotegraphConfig;
use notegraph_core::{BatchEmbedder, GraphStore};
use notegraph_enrichment::EmbeddingBatcher;
use notegraph_pipeline::{Retriever, SyncOrchestrator};
use notegraph_surrealdb::SurrealGraphStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// The opened datastore and embedding pool
pub struct Services {
    pub config: NotegraphConfig,
    pub store: Arc<SurrealGraphStore>,
    pub embedder: Arc<EmbeddingBatcher>,
}

impl Services {
    /// Connect the store, then start the embedding pool
    pub async fn open(config: NotegraphConfig) -> Result<Self> {
        let store = SurrealGraphStore::connect(&config)
            .await
            .with_context(|| format!("Failed to open datastore at {}", config.database.path))?;

        let embedder = match EmbeddingBatcher::from_config(&config) {
            Ok(embedder) => embedder,
            Err(e) => {
                if let Err(close_err) = store.close().await {
                    warn!("Failed to close datastore: {}", close_err);
                }
                return Err(e).context("Failed to start embedding provider");
            }
        };
        debug!(
            "Opened datastore {} with {:?} embeddings",
            config.database.path, config.embedding.provider
        );

        Ok(Self {
            config,
            store: Arc::new(store),
            embedder: Arc::new(embedder),
        })
    }

    pub fn orchestrator(&self) -> SyncOrchestrator {
        SyncOrchestrator::new(&self.config, self.store.clone(), self.embedder.clone())
    }

    pub fn retriever(&self) -> Retriever {
        Retriever::new(self.store.clone(), self.embedder.clone())
    }

    /// Stop the embedding pool and close the store; both are attempted
    /// even when the first fails
    pub async fn close(&self) -> Result<()> {
        let shutdown = self.embedder.shutdown().await;
        let closed = self.store.close().await;
        shutdown.context("Failed to stop embedding workers")?;
        closed.context("Failed to close datastore")?;
        Ok(())
    }
}
