//! Core abstractions for notegraph
//!
//! Everything the sync engine and retriever share lives here: the block data
//! model, file signatures, error types and the two capability seams
//! ([`EmbeddingProvider`]/[`BatchEmbedder`] and [`GraphStore`]/[`GraphReader`]).
//! Concrete implementations are injected by higher-level crates.

pub mod block;
pub mod embedding;
pub mod error;
pub mod signature;
pub mod similarity;
pub mod storage;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use block::{block_key, EmbeddedBlock, ParsedBlock, SourceMetadata};
pub use embedding::{BatchEmbedder, EmbeddingProvider};
pub use error::{
    EmbeddingError, EmbeddingResult, FileError, StoreError, StoreResult, SyncError, SyncResult,
};
pub use signature::{FileSignature, StoredSignature};
pub use similarity::{cosine_similarity, ordered_pair, similar_pairs};
pub use storage::{BlockSummary, GraphReader, GraphStore, ScoredBlock, SimilarEdge};
