//! Deterministic offline provider
//!
//! Hashes each lowercase alphanumeric token into one of `dimensions` buckets
//! and L2-normalizes the counts. Texts sharing words score high, unrelated
//! texts score near zero, and no network or model is needed. Text without
//! any token maps to the first unit vector so no embedding has zero norm.

use async_trait::async_trait;
use notegraph_core::{EmbeddingProvider, EmbeddingResult};

#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dimensions: usize,
    model: String,
}

impl MockEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            model: "mock-bag-of-words".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = blake3::hash(token.as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&hash.as_bytes()[..8]);
            let index = (u64::from_le_bytes(bucket) % self.dimensions as u64) as usize;
            vector[index] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        } else {
            vector[0] = 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn encode(&self, batch: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        Ok(batch.iter().map(|text| self.embed_text(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
