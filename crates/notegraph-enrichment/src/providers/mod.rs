//! Embedding provider implementations

mod mock;
mod ollama;

pub use mock::MockEmbeddingProvider;
pub use ollama::OllamaProvider;

use notegraph_config::{EmbeddingConfig, EmbeddingProviderType};
use notegraph_core::{EmbeddingProvider, EmbeddingResult};
use std::sync::Arc;

/// Build the provider selected by `[embedding].provider`
pub fn create_provider(config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn EmbeddingProvider>> {
    match config.provider {
        EmbeddingProviderType::Ollama => Ok(Arc::new(OllamaProvider::new(config)?)),
        EmbeddingProviderType::Mock => Ok(Arc::new(
            MockEmbeddingProvider::new(config.dimension).with_model(config.model.clone()),
        )),
    }
}
