//! Embedding capabilities

use crate::error::EmbeddingResult;
use async_trait::async_trait;

/// A model that turns a batch of texts into fixed-dimension vectors.
///
/// Implementations must return exactly one vector per input, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn encode(&self, batch: &[String]) -> EmbeddingResult<Vec<Vec<f32>>>;

    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;
}

/// Parallel, order-preserving embedding of arbitrarily many texts.
///
/// Lifecycle is explicit: construct (workers start), call [`embed`](Self::embed)
/// any number of times, then [`shutdown`](Self::shutdown).
#[async_trait]
pub trait BatchEmbedder: Send + Sync {
    async fn embed(&self, texts: Vec<String>) -> EmbeddingResult<Vec<Vec<f32>>>;

    fn dimensions(&self) -> usize;

    async fn shutdown(&self) -> EmbeddingResult<()>;
}
