//! SurrealDB implementation of the block graph
//!
//! Block record ids are the BLAKE3 key of their content, so an upsert of
//! identical text always lands on the same record. Edges are relation
//! tables (`tagged`, `similar`) with a unique `(in, out)` index; writers
//! delete a pair before relating it so repeated links stay single.

use crate::queries;
use crate::schema::SchemaSpec;
use crate::surreal_client::SurrealClient;
use crate::types::{BlockRow, CountRow, EmbeddingRow, SourceFileRow, SourceRow, TagLinkRow};
use async_trait::async_trait;
use notegraph_config::NotegraphConfig;
use notegraph_core::{
    block_key, similar_pairs, BlockSummary, EmbeddedBlock, FileSignature, GraphReader, GraphStore,
    ScoredBlock, SimilarEdge, SourceMetadata, StoreError, StoreResult, StoredSignature,
};
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SurrealGraphStore {
    client: SurrealClient,
    schema: SchemaSpec,
}

fn to_param<T: Serialize + ?Sized>(value: &T) -> StoreResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

impl SurrealGraphStore {
    pub fn new(client: SurrealClient, schema: SchemaSpec) -> Self {
        Self { client, schema }
    }

    /// Open the configured database and validate the index definition
    pub async fn connect(config: &NotegraphConfig) -> StoreResult<Self> {
        let schema = SchemaSpec::from_config(config)?;
        let client = SurrealClient::new((&config.database).into()).await?;
        Ok(Self::new(client, schema))
    }

    pub fn client(&self) -> &SurrealClient {
        &self.client
    }

    pub fn schema(&self) -> &SchemaSpec {
        &self.schema
    }

    async fn ensure_vector_index(&self) -> StoreResult<()> {
        let name = self.schema.index_name();
        let recorded: Vec<String> = self
            .client
            .query(queries::SCHEMA_META, &[json!({ "name": name })])
            .await?;
        let signature = self.schema.signature();

        if let Some(previous) = recorded.first().filter(|p| **p != signature) {
            // vector indexes are immutable: a definition change means drop and recreate
            warn!(
                "Vector index '{}' changed ({} -> {}), recreating",
                name, previous, signature
            );
            self.client
                .execute(&self.schema.remove_index_statement(), &[])
                .await
                .map_err(|e| StoreError::Schema(e.to_string()))?;
        }

        self.client
            .execute(&self.schema.vector_index_statement(), &[])
            .await
            .map_err(|e| StoreError::Schema(format!("Failed to define vector index: {}", e)))?;
        self.client
            .execute(
                queries::WRITE_SCHEMA_META,
                &[json!({ "name": name, "signature": signature })],
            )
            .await
    }

    async fn write_edges(&self, edges: &[SimilarEdge]) -> StoreResult<usize> {
        if edges.is_empty() {
            return Ok(0);
        }
        self.client
            .execute(queries::WRITE_SIMILAR, &[json!({ "edges": to_param(edges)? })])
            .await?;
        Ok(edges.len())
    }

    async fn all_embeddings(&self) -> StoreResult<Vec<(String, Vec<f32>)>> {
        let rows: Vec<EmbeddingRow> = self.client.query(queries::ALL_EMBEDDINGS, &[]).await?;
        Ok(rows.into_iter().map(|r| (r.key, r.embedding)).collect())
    }
}

#[async_trait]
impl GraphStore for SurrealGraphStore {
    async fn ping(&self) -> StoreResult<()> {
        self.client.health().await
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        self.client
            .execute(self.schema.base_statements(), &[])
            .await
            .map_err(|e| match e {
                StoreError::Closed => StoreError::Closed,
                other => StoreError::Schema(other.to_string()),
            })?;
        self.ensure_vector_index().await?;
        info!(
            "Schema ready (index '{}', dimension {})",
            self.schema.index_name(),
            self.schema.dimension()
        );
        Ok(())
    }

    async fn delete_blocks_for_file(&self, path: &str) -> StoreResult<usize> {
        let params = [json!({ "path": path })];
        let keys: Vec<String> = self
            .client
            .query(queries::BLOCK_KEYS_FOR_FILE, &params)
            .await?;
        self.client.execute(queries::DELETE_FILE, &params).await?;
        debug!("Deleted {} blocks for {}", keys.len(), path);
        Ok(keys.len())
    }

    async fn upsert_blocks(
        &self,
        blocks: &[EmbeddedBlock],
        source: &SourceMetadata,
    ) -> StoreResult<usize> {
        if blocks.is_empty() {
            return Ok(0);
        }

        let rows: Vec<BlockRow> = blocks.iter().map(BlockRow::from).collect();
        let source_row = SourceRow::from(source);
        self.client
            .execute(
                queries::UPSERT_BLOCKS,
                &[json!({ "blocks": to_param(&rows)?, "source": to_param(&source_row)? })],
            )
            .await?;
        debug!("Upserted {} blocks for {}", rows.len(), source.path);
        Ok(rows.len())
    }

    async fn upsert_tag_links(&self, links: &[(String, String)]) -> StoreResult<usize> {
        if links.is_empty() {
            return Ok(0);
        }

        let rows: Vec<TagLinkRow> = links
            .iter()
            .map(|(content, tag)| TagLinkRow {
                key: block_key(content),
                tag: tag.clone(),
            })
            .collect();
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        let existing: HashSet<String> = self
            .client
            .query::<String>(queries::EXISTING_KEYS, &[json!({ "keys": keys })])
            .await?
            .into_iter()
            .collect();

        let rows: Vec<TagLinkRow> = rows
            .into_iter()
            .filter(|r| existing.contains(&r.key))
            .collect();
        if rows.is_empty() {
            return Ok(0);
        }

        self.client
            .execute(queries::UPSERT_TAG_LINKS, &[json!({ "links": to_param(&rows)? })])
            .await?;
        Ok(rows.len())
    }

    async fn link_similar(&self, threshold: f32) -> StoreResult<usize> {
        let entries = self.all_embeddings().await?;
        self.client.execute(queries::CLEAR_SIMILAR, &[]).await?;

        let edges = similar_pairs(&entries, None, threshold);
        let written = self.write_edges(&edges).await?;
        info!(
            "Full similarity pass over {} blocks: {} edges",
            entries.len(),
            written
        );
        Ok(written)
    }

    async fn link_similar_for(&self, contents: &[String], threshold: f32) -> StoreResult<usize> {
        if contents.is_empty() {
            return Ok(0);
        }

        let touched: HashSet<String> = contents.iter().map(|c| block_key(c)).collect();
        let entries = self.all_embeddings().await?;
        let edges = similar_pairs(&entries, Some(&touched), threshold);
        let written = self.write_edges(&edges).await?;
        debug!(
            "Incremental similarity pass for {} blocks: {} edges",
            touched.len(),
            written
        );
        Ok(written)
    }

    async fn stored_signatures(&self) -> StoreResult<HashMap<String, StoredSignature>> {
        let rows: Vec<SourceFileRow> = self.client.query(queries::SOURCE_FILES, &[]).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let stored = StoredSignature {
                    signature: FileSignature::new(
                        row.last_modified,
                        u64::try_from(row.file_size).unwrap_or_default(),
                    ),
                    block_count: usize::try_from(row.block_count).unwrap_or_default(),
                };
                (row.path, stored)
            })
            .collect())
    }

    async fn record_file(&self, source: &SourceMetadata, block_count: usize) -> StoreResult<()> {
        let row = SourceRow::from(source);
        self.client
            .execute(
                queries::RECORD_FILE,
                &[json!({
                    "path": row.path,
                    "last_modified": row.last_modified,
                    "file_size": row.file_size,
                    "block_count": block_count,
                    "synced_at": chrono::Utc::now().to_rfc3339(),
                })],
            )
            .await
    }

    async fn close(&self) -> StoreResult<()> {
        self.client.close().await
    }
}

#[async_trait]
impl GraphReader for SurrealGraphStore {
    async fn nearest_blocks(
        &self,
        query: &[f32],
        limit: usize,
        tags: &[String],
    ) -> StoreResult<Vec<ScoredBlock>> {
        if limit == 0 || query.is_empty() {
            return Ok(Vec::new());
        }

        let params = [json!({ "vector": query, "tags": tags })];

        if tags.is_empty() {
            let sql = queries::knn_search(&self.schema.knn_operator(limit));
            match self.client.query::<ScoredBlock>(&sql, &params).await {
                Ok(hits) => return Ok(hits),
                Err(StoreError::Closed) => return Err(StoreError::Closed),
                Err(e) => warn!("Vector index search failed, using exhaustive scan: {}", e),
            }
        }

        self.client
            .query(&queries::brute_force_search(limit, !tags.is_empty()), &params)
            .await
    }

    async fn block_by_content(&self, content: &str) -> StoreResult<Option<BlockSummary>> {
        let rows: Vec<BlockSummary> = self
            .client
            .query(queries::BLOCK_BY_CONTENT, &[json!({ "content": content })])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn blocks_by_keys(&self, keys: &[String]) -> StoreResult<Vec<BlockSummary>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .query(queries::BLOCKS_BY_KEYS, &[json!({ "keys": keys })])
            .await
    }

    async fn blocks_tagged(&self, tag: &str) -> StoreResult<Vec<BlockSummary>> {
        self.client
            .query(queries::BLOCKS_TAGGED, &[json!({ "tag": tag })])
            .await
    }

    async fn similar_edges(&self, keys: &[String]) -> StoreResult<Vec<SimilarEdge>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .query(queries::SIMILAR_EDGES, &[json!({ "keys": keys })])
            .await
    }

    async fn block_count(&self) -> StoreResult<usize> {
        let rows: Vec<CountRow> = self.client.query(queries::BLOCK_COUNT, &[]).await?;
        Ok(rows
            .first()
            .map(|r| usize::try_from(r.count).unwrap_or_default())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notegraph_core::ParsedBlock;
    use tracing_test::traced_test;

    async fn store(dimension: usize) -> SurrealGraphStore {
        let client = SurrealClient::new_isolated_memory().await.unwrap();
        let schema = SchemaSpec::cosine("block_embedding", dimension).unwrap();
        let store = SurrealGraphStore::new(client, schema);
        store.ensure_schema().await.unwrap();
        store
    }

    #[tokio::test]
    #[traced_test]
    async fn test_dimension_change_recreates_index() {
        let first = store(3).await;
        let client = first.client().clone();

        let schema = SchemaSpec::cosine("block_embedding", 4).unwrap();
        let second = SurrealGraphStore::new(client, schema);
        second.ensure_schema().await.unwrap();

        assert!(logs_contain("recreating"));

        let block = EmbeddedBlock::new(
            ParsedBlock::new("four dims", 0),
            vec![1.0, 0.0, 0.0, 0.0],
        );
        second
            .upsert_blocks(
                &[block],
                &SourceMetadata::new("a.md", FileSignature::new(1, 1)),
            )
            .await
            .unwrap();
        assert_eq!(second.block_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_store_counts_zero() {
        let store = store(3).await;
        assert_eq!(store.block_count().await.unwrap(), 0);
        assert!(store
            .nearest_blocks(&[1.0, 0.0, 0.0], 5, &[])
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_untagged_nearest_uses_vector_index() {
        let store = store(3).await;
        let source = SourceMetadata::new("v.md", FileSignature::new(1, 1));
        let blocks = vec![
            EmbeddedBlock::new(ParsedBlock::new("east", 0), vec![1.0, 0.0, 0.0]),
            EmbeddedBlock::new(ParsedBlock::new("north", 0), vec![0.0, 1.0, 0.0]),
            EmbeddedBlock::new(ParsedBlock::new("up", 0), vec![0.0, 0.0, 1.0]),
        ];
        store.upsert_blocks(&blocks, &source).await.unwrap();

        let hits = store.nearest_blocks(&[0.9, 0.1, 0.0], 2, &[]).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "east");
        assert!(!logs_contain("exhaustive scan"));
    }
}
