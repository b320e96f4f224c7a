//! Common test utilities for SurrealDB graph store tests

#![allow(dead_code)]

use notegraph_core::{EmbeddedBlock, FileSignature, GraphStore, ParsedBlock, SourceMetadata};
use notegraph_surrealdb::{SchemaSpec, SurrealClient, SurrealGraphStore};

pub const DIM: usize = 3;

/// Fresh isolated in-memory store with the schema applied
pub async fn setup_store() -> SurrealGraphStore {
    let client = SurrealClient::new_isolated_memory()
        .await
        .expect("Failed to create SurrealDB client");
    let store = SurrealGraphStore::new(
        client,
        SchemaSpec::cosine("block_embedding", DIM).expect("valid schema"),
    );
    store.ensure_schema().await.expect("Failed to apply schema");
    store
}

pub fn source(path: &str, modified_ns: i64, size: u64) -> SourceMetadata {
    SourceMetadata::new(path, FileSignature::new(modified_ns, size))
}

pub fn block(content: &str, embedding: [f32; DIM]) -> EmbeddedBlock {
    EmbeddedBlock::new(ParsedBlock::new(content, 0), embedding.to_vec())
}

pub fn tagged_block(content: &str, tags: &[&str], embedding: [f32; DIM]) -> EmbeddedBlock {
    EmbeddedBlock::new(
        ParsedBlock::new(content, 0).with_tags(tags.iter().copied()),
        embedding.to_vec(),
    )
}
