//! In-memory graph store
//!
//! Reference implementation of [`GraphStore`] and [`GraphReader`] with call
//! counters, used to check orchestration behaviour without a database.

use crate::block::{EmbeddedBlock, SourceMetadata};
use crate::error::{StoreError, StoreResult};
use crate::signature::StoredSignature;
use crate::similarity::{cosine_similarity, similar_pairs};
use crate::storage::{BlockSummary, GraphReader, GraphStore, ScoredBlock, SimilarEdge};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// A stored block with its attribution
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlock {
    pub key: String,
    pub content: String,
    pub level: usize,
    pub tags: Vec<String>,
    pub embedding: Vec<f32>,
    pub source_file: String,
    pub last_modified: i64,
    pub file_size: u64,
}

/// Per-path write counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub deletes: usize,
    pub upserts: usize,
    pub tag_writes: usize,
    pub records: usize,
}

#[derive(Debug, Default)]
struct State {
    blocks: HashMap<String, StoredBlock>,
    tags: BTreeSet<String>,
    tagged: BTreeSet<(String, String)>,
    similar: BTreeMap<(String, String), f32>,
    files: HashMap<String, StoredSignature>,
    ops: HashMap<String, OpCounts>,
    full_link_passes: usize,
    incremental_link_passes: usize,
    failing_paths: HashSet<String>,
    closed: bool,
    reachable: bool,
}

/// Thread-safe in-memory [`GraphStore`]
#[derive(Debug)]
pub struct InMemoryGraphStore {
    state: Mutex<State>,
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                reachable: true,
                ..State::default()
            }),
        }
    }

    /// A store whose `ping` always fails
    pub fn unreachable() -> Self {
        let store = Self::new();
        store.state.lock().reachable = false;
        store
    }

    /// Make `upsert_blocks` fail for this path
    pub fn fail_writes_for(&self, path: &str) {
        self.state.lock().failing_paths.insert(path.to_string());
    }

    pub fn clear_failures(&self) {
        self.state.lock().failing_paths.clear();
    }

    pub fn ops_for(&self, path: &str) -> OpCounts {
        self.state.lock().ops.get(path).cloned().unwrap_or_default()
    }

    pub fn reset_ops(&self) {
        self.state.lock().ops.clear();
    }

    /// Total delete calls across all paths
    pub fn total_deletes(&self) -> usize {
        self.state.lock().ops.values().map(|o| o.deletes).sum()
    }

    /// Total upsert calls across all paths
    pub fn total_upserts(&self) -> usize {
        self.state.lock().ops.values().map(|o| o.upserts).sum()
    }

    pub fn link_passes(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.full_link_passes, state.incremental_link_passes)
    }

    pub fn block(&self, content: &str) -> Option<StoredBlock> {
        self.state
            .lock()
            .blocks
            .values()
            .find(|b| b.content == content)
            .cloned()
    }

    /// Sorted contents of every stored block
    pub fn contents(&self) -> Vec<String> {
        let mut contents: Vec<String> = self
            .state
            .lock()
            .blocks
            .values()
            .map(|b| b.content.clone())
            .collect();
        contents.sort();
        contents
    }

    pub fn contents_for_file(&self, path: &str) -> Vec<String> {
        let mut contents: Vec<String> = self
            .state
            .lock()
            .blocks
            .values()
            .filter(|b| b.source_file == path)
            .map(|b| b.content.clone())
            .collect();
        contents.sort();
        contents
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.state.lock().tags.iter().cloned().collect()
    }

    pub fn similar_edge_count(&self) -> usize {
        self.state.lock().similar.len()
    }

    fn check_open(state: &State) -> StoreResult<()> {
        if state.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn summary(block: &StoredBlock) -> BlockSummary {
        BlockSummary {
            key: block.key.clone(),
            content: block.content.clone(),
            tags: block.tags.clone(),
        }
    }

    fn write_edges(state: &mut State, edges: Vec<SimilarEdge>) -> usize {
        let count = edges.len();
        for edge in edges {
            state.similar.insert((edge.from_key, edge.to_key), edge.score);
        }
        count
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn ping(&self) -> StoreResult<()> {
        let state = self.state.lock();
        Self::check_open(&state)?;
        if !state.reachable {
            return Err(StoreError::Connection("in-memory store unreachable".into()));
        }
        Ok(())
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        Self::check_open(&self.state.lock())
    }

    async fn delete_blocks_for_file(&self, path: &str) -> StoreResult<usize> {
        let mut state = self.state.lock();
        Self::check_open(&state)?;
        state.ops.entry(path.to_string()).or_default().deletes += 1;

        let doomed: HashSet<String> = state
            .blocks
            .values()
            .filter(|b| b.source_file == path)
            .map(|b| b.key.clone())
            .collect();
        state.blocks.retain(|key, _| !doomed.contains(key));
        state.tagged.retain(|(key, _)| !doomed.contains(key));
        state
            .similar
            .retain(|(from, to), _| !doomed.contains(from) && !doomed.contains(to));
        state.files.remove(path);
        Ok(doomed.len())
    }

    async fn upsert_blocks(
        &self,
        blocks: &[EmbeddedBlock],
        source: &SourceMetadata,
    ) -> StoreResult<usize> {
        let mut state = self.state.lock();
        Self::check_open(&state)?;
        state.ops.entry(source.path.clone()).or_default().upserts += 1;
        if state.failing_paths.contains(&source.path) {
            return Err(StoreError::Query(format!(
                "injected write failure for {}",
                source.path
            )));
        }

        for block in blocks {
            let key = block.key();
            state.blocks.insert(
                key.clone(),
                StoredBlock {
                    key,
                    content: block.block.content.clone(),
                    level: block.block.level,
                    tags: block.block.tags.iter().cloned().collect(),
                    embedding: block.embedding.clone(),
                    source_file: source.path.clone(),
                    last_modified: source.signature.modified_ns,
                    file_size: source.signature.size,
                },
            );
        }
        Ok(blocks.len())
    }

    async fn upsert_tag_links(&self, links: &[(String, String)]) -> StoreResult<usize> {
        let mut state = self.state.lock();
        Self::check_open(&state)?;

        let mut written = 0;
        for (content, tag) in links {
            let Some(block) = state.blocks.values().find(|b| &b.content == content) else {
                continue;
            };
            let (key, path) = (block.key.clone(), block.source_file.clone());
            state.tags.insert(tag.clone());
            state.tagged.insert((key, tag.clone()));
            state.ops.entry(path).or_default().tag_writes += 1;
            written += 1;
        }
        Ok(written)
    }

    async fn link_similar(&self, threshold: f32) -> StoreResult<usize> {
        let mut state = self.state.lock();
        Self::check_open(&state)?;
        state.full_link_passes += 1;
        state.similar.clear();

        let entries: Vec<(String, Vec<f32>)> = state
            .blocks
            .values()
            .map(|b| (b.key.clone(), b.embedding.clone()))
            .collect();
        let edges = similar_pairs(&entries, None, threshold);
        Ok(Self::write_edges(&mut state, edges))
    }

    async fn link_similar_for(&self, contents: &[String], threshold: f32) -> StoreResult<usize> {
        let mut state = self.state.lock();
        Self::check_open(&state)?;
        state.incremental_link_passes += 1;

        let touched: HashSet<String> = contents.iter().map(|c| crate::block_key(c)).collect();
        let entries: Vec<(String, Vec<f32>)> = state
            .blocks
            .values()
            .map(|b| (b.key.clone(), b.embedding.clone()))
            .collect();
        let edges = similar_pairs(&entries, Some(&touched), threshold);
        Ok(Self::write_edges(&mut state, edges))
    }

    async fn stored_signatures(&self) -> StoreResult<HashMap<String, StoredSignature>> {
        let state = self.state.lock();
        Self::check_open(&state)?;
        Ok(state.files.clone())
    }

    async fn record_file(&self, source: &SourceMetadata, block_count: usize) -> StoreResult<()> {
        let mut state = self.state.lock();
        Self::check_open(&state)?;
        state.ops.entry(source.path.clone()).or_default().records += 1;
        state.files.insert(
            source.path.clone(),
            StoredSignature {
                signature: source.signature,
                block_count,
            },
        );
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}

#[async_trait]
impl GraphReader for InMemoryGraphStore {
    async fn nearest_blocks(
        &self,
        query: &[f32],
        limit: usize,
        tags: &[String],
    ) -> StoreResult<Vec<ScoredBlock>> {
        let state = self.state.lock();
        Self::check_open(&state)?;

        let mut scored: Vec<ScoredBlock> = state
            .blocks
            .values()
            .filter(|b| tags.is_empty() || b.tags.iter().any(|t| tags.contains(t)))
            .map(|b| ScoredBlock {
                key: b.key.clone(),
                content: b.content.clone(),
                tags: b.tags.clone(),
                score: cosine_similarity(query, &b.embedding),
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.content.cmp(&b.content))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn block_by_content(&self, content: &str) -> StoreResult<Option<BlockSummary>> {
        let state = self.state.lock();
        Self::check_open(&state)?;
        Ok(state
            .blocks
            .get(&crate::block_key(content))
            .map(Self::summary))
    }

    async fn blocks_by_keys(&self, keys: &[String]) -> StoreResult<Vec<BlockSummary>> {
        let state = self.state.lock();
        Self::check_open(&state)?;
        Ok(keys
            .iter()
            .filter_map(|k| state.blocks.get(k))
            .map(Self::summary)
            .collect())
    }

    async fn blocks_tagged(&self, tag: &str) -> StoreResult<Vec<BlockSummary>> {
        let state = self.state.lock();
        Self::check_open(&state)?;
        Ok(state
            .tagged
            .iter()
            .filter(|(_, t)| t == tag)
            .filter_map(|(key, _)| state.blocks.get(key))
            .map(Self::summary)
            .collect())
    }

    async fn similar_edges(&self, keys: &[String]) -> StoreResult<Vec<SimilarEdge>> {
        let state = self.state.lock();
        Self::check_open(&state)?;
        let keys: HashSet<&String> = keys.iter().collect();
        Ok(state
            .similar
            .iter()
            .filter(|((from, to), _)| keys.contains(from) || keys.contains(to))
            .map(|((from, to), score)| SimilarEdge {
                from_key: from.clone(),
                to_key: to.clone(),
                score: *score,
            })
            .collect())
    }

    async fn block_count(&self) -> StoreResult<usize> {
        let state = self.state.lock();
        Self::check_open(&state)?;
        Ok(state.blocks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ParsedBlock;
    use crate::signature::FileSignature;

    fn source(path: &str) -> SourceMetadata {
        SourceMetadata::new(path, FileSignature::new(1, 10))
    }

    fn embedded(content: &str, v: &[f32]) -> EmbeddedBlock {
        EmbeddedBlock::new(ParsedBlock::new(content, 0), v.to_vec())
    }

    #[tokio::test]
    async fn test_identical_content_merges() {
        let store = InMemoryGraphStore::new();
        let blocks = vec![embedded("same", &[1.0, 0.0])];
        store.upsert_blocks(&blocks, &source("a.md")).await.unwrap();
        store.upsert_blocks(&blocks, &source("b.md")).await.unwrap();

        assert_eq!(store.block_count().await.unwrap(), 1);
        assert_eq!(store.block("same").unwrap().source_file, "b.md");
    }

    #[tokio::test]
    async fn test_delete_removes_edges_and_marker() {
        let store = InMemoryGraphStore::new();
        store
            .upsert_blocks(
                &[embedded("a", &[1.0, 0.0]), embedded("b", &[1.0, 0.0])],
                &source("a.md"),
            )
            .await
            .unwrap();
        store
            .upsert_blocks(&[embedded("c", &[1.0, 0.0])], &source("c.md"))
            .await
            .unwrap();
        store.record_file(&source("a.md"), 2).await.unwrap();
        store
            .upsert_tag_links(&[("a".into(), "t".into())])
            .await
            .unwrap();
        assert_eq!(store.link_similar(0.5).await.unwrap(), 3);

        assert_eq!(store.delete_blocks_for_file("a.md").await.unwrap(), 2);
        assert_eq!(store.similar_edge_count(), 0);
        assert!(store.blocks_tagged("t").await.unwrap().is_empty());
        assert!(store.stored_signatures().await.unwrap().is_empty());
        assert_eq!(store.tag_names(), vec!["t".to_string()]);
    }

    #[tokio::test]
    async fn test_closed_store_rejects_calls() {
        let store = InMemoryGraphStore::new();
        store.close().await.unwrap();
        assert!(matches!(store.ping().await, Err(StoreError::Closed)));
        assert!(matches!(
            store.block_count().await,
            Err(StoreError::Closed)
        ));
    }
}
