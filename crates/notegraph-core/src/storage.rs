//! Graph storage abstractions
//!
//! [`GraphStore`] is the write side used by the sync orchestrator,
//! [`GraphReader`] the read side used by the retriever. All writes are
//! idempotent under merge-by-content semantics: a block's record identity is
//! [`block_key`](crate::block_key) of its content.

use crate::block::{EmbeddedBlock, SourceMetadata};
use crate::error::StoreResult;
use crate::signature::StoredSignature;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Block fields needed by graph traversals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub key: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A block ranked against a query vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBlock {
    pub key: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub score: f32,
}

/// SIMILAR edge, oriented from the lower key to the higher key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarEdge {
    pub from_key: String,
    pub to_key: String,
    pub score: f32,
}

impl SimilarEdge {
    /// The endpoint opposite `key`, if `key` is an endpoint
    pub fn other(&self, key: &str) -> Option<&str> {
        if self.from_key == key {
            Some(&self.to_key)
        } else if self.to_key == key {
            Some(&self.from_key)
        } else {
            None
        }
    }
}

/// Write side of the block graph
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Connectivity probe
    async fn ping(&self) -> StoreResult<()>;

    /// Create uniqueness constraints and the vector index if absent
    async fn ensure_schema(&self) -> StoreResult<()>;

    /// Remove every block attributed to `path`, their edges and the file's
    /// recorded signature. Returns the number of blocks removed.
    async fn delete_blocks_for_file(&self, path: &str) -> StoreResult<usize>;

    /// Merge blocks by content in a single bulk write
    async fn upsert_blocks(
        &self,
        blocks: &[EmbeddedBlock],
        source: &SourceMetadata,
    ) -> StoreResult<usize>;

    /// Merge tags by name and link them from the block with matching content.
    /// Pairs whose block does not exist are skipped.
    async fn upsert_tag_links(&self, links: &[(String, String)]) -> StoreResult<usize>;

    /// Full pairwise pass over the corpus
    async fn link_similar(&self, threshold: f32) -> StoreResult<usize>;

    /// Compare only the blocks with these contents against the corpus
    async fn link_similar_for(&self, contents: &[String], threshold: f32) -> StoreResult<usize>;

    /// Signatures of files whose processing completed
    async fn stored_signatures(&self) -> StoreResult<HashMap<String, StoredSignature>>;

    /// Commit marker for a file, written after its blocks and tags
    async fn record_file(&self, source: &SourceMetadata, block_count: usize) -> StoreResult<()>;

    /// Release the connection. Later calls fail with `StoreError::Closed`.
    async fn close(&self) -> StoreResult<()>;
}

/// Read side of the block graph
#[async_trait]
pub trait GraphReader: Send + Sync {
    /// Nearest blocks to `query` by cosine score, descending. A non-empty
    /// `tags` restricts results to blocks carrying at least one of them.
    async fn nearest_blocks(
        &self,
        query: &[f32],
        limit: usize,
        tags: &[String],
    ) -> StoreResult<Vec<ScoredBlock>>;

    async fn block_by_content(&self, content: &str) -> StoreResult<Option<BlockSummary>>;

    async fn blocks_by_keys(&self, keys: &[String]) -> StoreResult<Vec<BlockSummary>>;

    /// Blocks linked to the tag via TAGGED
    async fn blocks_tagged(&self, tag: &str) -> StoreResult<Vec<BlockSummary>>;

    /// SIMILAR edges with at least one endpoint in `keys`
    async fn similar_edges(&self, keys: &[String]) -> StoreResult<Vec<SimilarEdge>>;

    async fn block_count(&self) -> StoreResult<usize>;
}
