//! Retrieval errors
//!
//! Sync errors live in `notegraph_core::SyncError`; retrieval only fails when
//! the query cannot be embedded or the store cannot be read.

use notegraph_core::{EmbeddingError, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Failed to embed query: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Failed to read graph: {0}")]
    Store(#[from] StoreError),

    #[error("Embedder returned no vector for the query")]
    EmptyEmbedding,
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;
