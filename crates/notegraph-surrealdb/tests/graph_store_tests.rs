//! Graph store behaviour against an embedded in-memory SurrealDB
//!
//! These tests cover:
//! - Merge-by-content upserts and file attribution
//! - File-level delete of blocks, edges and the commit marker
//! - Tag links and SIMILAR edges (strict threshold, pair orientation)
//! - Recorded signatures
//! - Reader queries used by retrieval
//! - Connection lifecycle and identifier validation

mod common;
use common::*;

use notegraph_core::{block_key, cosine_similarity, GraphReader, GraphStore, StoreError};
use notegraph_surrealdb::SchemaSpec;

#[tokio::test]
async fn test_identical_content_merges_into_one_block() {
    let store = setup_store().await;
    let blocks = vec![block("shared line", [1.0, 0.0, 0.0])];

    store.upsert_blocks(&blocks, &source("a.md", 1, 10)).await.unwrap();
    store.upsert_blocks(&blocks, &source("a.md", 1, 10)).await.unwrap();
    store.upsert_blocks(&blocks, &source("b.md", 2, 20)).await.unwrap();

    assert_eq!(store.block_count().await.unwrap(), 1);

    // last writer wins attribution
    let owners: Vec<String> = store
        .client()
        .query("SELECT VALUE source_file FROM block", &[])
        .await
        .unwrap();
    assert_eq!(owners, vec!["b.md".to_string()]);
}

#[tokio::test]
async fn test_upsert_preserves_level_and_tags() {
    let store = setup_store().await;
    let parsed = notegraph_core::ParsedBlock::new("nested #rust", 2).with_tags(["rust"]);
    let blocks = vec![notegraph_core::EmbeddedBlock::new(parsed, vec![0.0, 1.0, 0.0])];

    assert_eq!(
        store.upsert_blocks(&blocks, &source("n.md", 5, 50)).await.unwrap(),
        1
    );

    let levels: Vec<i64> = store
        .client()
        .query("SELECT VALUE level FROM block", &[])
        .await
        .unwrap();
    assert_eq!(levels, vec![2]);

    let found = store.block_by_content("nested #rust").await.unwrap().unwrap();
    assert_eq!(found.key, block_key("nested #rust"));
    assert_eq!(found.tags, vec!["rust".to_string()]);
}

#[tokio::test]
async fn test_delete_for_file_removes_blocks_edges_and_marker() {
    let store = setup_store().await;
    let a = source("a.md", 1, 10);
    store
        .upsert_blocks(
            &[block("alpha", [1.0, 0.0, 0.0]), block("beta", [0.9, 0.1, 0.0])],
            &a,
        )
        .await
        .unwrap();
    store
        .upsert_blocks(&[block("gamma", [0.9, 0.0, 0.1])], &source("c.md", 1, 5))
        .await
        .unwrap();
    store.record_file(&a, 2).await.unwrap();
    store
        .upsert_tag_links(&[("alpha".to_string(), "greek".to_string())])
        .await
        .unwrap();
    assert_eq!(store.link_similar(0.5).await.unwrap(), 3);

    assert_eq!(store.delete_blocks_for_file("a.md").await.unwrap(), 2);

    assert_eq!(store.block_count().await.unwrap(), 1);
    assert!(store.blocks_tagged("greek").await.unwrap().is_empty());
    assert!(store
        .similar_edges(&[block_key("gamma")])
        .await
        .unwrap()
        .is_empty());
    assert!(!store.stored_signatures().await.unwrap().contains_key("a.md"));

    // orphaned tags persist
    let tags: Vec<String> = store
        .client()
        .query("SELECT VALUE name FROM tag", &[])
        .await
        .unwrap();
    assert_eq!(tags, vec!["greek".to_string()]);

    // deleting an unknown file is a no-op
    assert_eq!(store.delete_blocks_for_file("missing.md").await.unwrap(), 0);
}

#[tokio::test]
async fn test_tag_links_skip_missing_blocks_and_stay_single() {
    let store = setup_store().await;
    store
        .upsert_blocks(&[block("present", [1.0, 0.0, 0.0])], &source("t.md", 1, 1))
        .await
        .unwrap();

    let links = vec![
        ("present".to_string(), "Topic".to_string()),
        ("absent".to_string(), "Topic".to_string()),
    ];
    assert_eq!(store.upsert_tag_links(&links).await.unwrap(), 1);
    assert_eq!(store.upsert_tag_links(&links).await.unwrap(), 1);

    let tagged = store.blocks_tagged("Topic").await.unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].content, "present");

    // case is preserved, so a lowercase lookup finds nothing
    assert!(store.blocks_tagged("topic").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_similar_threshold_is_strict() {
    let store = setup_store().await;
    let a = [1.0, 0.0, 0.0];
    let d = [1.0, 1.0, 0.0];
    store
        .upsert_blocks(&[block("left", a), block("diagonal", d)], &source("s.md", 1, 1))
        .await
        .unwrap();

    let score = cosine_similarity(&a, &d);
    assert_eq!(store.link_similar(score).await.unwrap(), 0);
    assert_eq!(store.link_similar(score - 0.01).await.unwrap(), 1);

    let edges = store.similar_edges(&[block_key("left")]).await.unwrap();
    assert_eq!(edges.len(), 1);
    assert!(edges[0].from_key < edges[0].to_key);
    assert!((edges[0].score - score).abs() < 1e-4);
}

#[tokio::test]
async fn test_incremental_link_only_touches_given_blocks() {
    let store = setup_store().await;
    store
        .upsert_blocks(
            &[
                block("alpha", [1.0, 0.0, 0.0]),
                block("beta", [0.9, 0.1, 0.0]),
                block("gamma", [0.9, 0.0, 0.1]),
            ],
            &source("i.md", 1, 1),
        )
        .await
        .unwrap();

    let written = store
        .link_similar_for(&["alpha".to_string()], 0.5)
        .await
        .unwrap();
    assert_eq!(written, 2);

    // beta-gamma was never evaluated
    let beta_edges = store.similar_edges(&[block_key("beta")]).await.unwrap();
    assert_eq!(beta_edges.len(), 1);
    assert_eq!(beta_edges[0].other(&block_key("beta")), Some(block_key("alpha").as_str()));

    // re-linking does not duplicate edges
    store
        .link_similar_for(&["alpha".to_string()], 0.5)
        .await
        .unwrap();
    let all_keys = vec![block_key("alpha"), block_key("beta"), block_key("gamma")];
    assert_eq!(store.similar_edges(&all_keys).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_full_relink_drops_stale_edges() {
    let store = setup_store().await;
    let path = source("r.md", 1, 1);
    store
        .upsert_blocks(
            &[
                block("alpha", [1.0, 0.0, 0.0]),
                block("beta", [0.9, 0.1, 0.0]),
                block("gamma", [0.9, 0.0, 0.1]),
            ],
            &path,
        )
        .await
        .unwrap();
    assert_eq!(store.link_similar(0.5).await.unwrap(), 3);

    // beta's embedding moves away from the others
    store
        .upsert_blocks(&[block("beta", [0.0, 1.0, 0.0])], &path)
        .await
        .unwrap();
    assert_eq!(store.link_similar(0.5).await.unwrap(), 1);

    let all_keys = vec![block_key("alpha"), block_key("beta"), block_key("gamma")];
    let edges = store.similar_edges(&all_keys).await.unwrap();
    assert_eq!(edges.len(), 1);
    assert!(edges[0].other(&block_key("beta")).is_none());
}

#[tokio::test]
async fn test_recorded_signatures_round_trip() {
    let store = setup_store().await;
    assert!(store.stored_signatures().await.unwrap().is_empty());

    store.record_file(&source("x.md", 1_700_000_000_123_456_789, 42), 3).await.unwrap();
    store.record_file(&source("x.md", 1_700_000_000_999_999_999, 43), 4).await.unwrap();

    let recorded = store.stored_signatures().await.unwrap();
    assert_eq!(recorded.len(), 1);
    let x = recorded["x.md"];
    assert_eq!(x.signature.modified_ns, 1_700_000_000_999_999_999);
    assert_eq!(x.signature.size, 43);
    assert_eq!(x.block_count, 4);
}

#[tokio::test]
async fn test_nearest_blocks_rank_and_filter() {
    let store = setup_store().await;
    store
        .upsert_blocks(
            &[
                tagged_block("east", &["compass"], [1.0, 0.0, 0.0]),
                tagged_block("east by north", &[], [0.9, 0.1, 0.0]),
                tagged_block("north", &["compass"], [0.0, 1.0, 0.0]),
            ],
            &source("n.md", 1, 1),
        )
        .await
        .unwrap();

    let hits = store.nearest_blocks(&[1.0, 0.0, 0.0], 2, &[]).await.unwrap();
    let contents: Vec<&str> = hits.iter().map(|h| h.content.as_str()).collect();
    assert_eq!(contents, vec!["east", "east by north"]);
    assert!(hits[0].score >= hits[1].score);

    let filtered = store
        .nearest_blocks(&[0.9, 0.1, 0.0], 5, &["compass".to_string()])
        .await
        .unwrap();
    let contents: Vec<&str> = filtered.iter().map(|h| h.content.as_str()).collect();
    assert_eq!(contents, vec!["east", "north"]);

    assert!(store.nearest_blocks(&[1.0, 0.0, 0.0], 0, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blocks_by_keys_ignores_unknown_keys() {
    let store = setup_store().await;
    store
        .upsert_blocks(
            &[block("one", [1.0, 0.0, 0.0]), block("two", [0.0, 1.0, 0.0])],
            &source("k.md", 1, 1),
        )
        .await
        .unwrap();

    let found = store
        .blocks_by_keys(&[block_key("two"), block_key("nope"), block_key("one")])
        .await
        .unwrap();
    let contents: Vec<&str> = found.iter().map(|b| b.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two"]);
    assert!(store.block_by_content("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_schema_setup_is_idempotent() {
    let store = setup_store().await;
    store.ensure_schema().await.unwrap();
    store.ensure_schema().await.unwrap();
    store.ping().await.unwrap();
}

#[tokio::test]
async fn test_values_are_bound_not_interpolated() {
    let store = setup_store().await;
    let hostile = "'); REMOVE TABLE block; --";
    store
        .upsert_blocks(&[block(hostile, [1.0, 0.0, 0.0])], &source("h.md", 1, 1))
        .await
        .unwrap();
    store
        .upsert_tag_links(&[(hostile.to_string(), "x'); DELETE tag; --".to_string())])
        .await
        .unwrap();

    assert_eq!(store.block_count().await.unwrap(), 1);
    assert_eq!(
        store.block_by_content(hostile).await.unwrap().unwrap().content,
        hostile
    );
    assert_eq!(store.blocks_tagged("x'); DELETE tag; --").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_identifier_validation_rejects_injection() {
    let err = SchemaSpec::cosine("idx ON TABLE block; REMOVE TABLE block", DIM).unwrap_err();
    assert!(matches!(err, StoreError::InvalidIdentifier(_)));
}

#[tokio::test]
async fn test_closed_store_rejects_every_call() {
    let store = setup_store().await;
    store.close().await.unwrap();

    assert!(matches!(store.ping().await, Err(StoreError::Closed)));
    assert!(matches!(store.block_count().await, Err(StoreError::Closed)));
    assert!(matches!(
        store.nearest_blocks(&[1.0, 0.0, 0.0], 3, &[]).await,
        Err(StoreError::Closed)
    ));
    assert!(matches!(
        store.delete_blocks_for_file("a.md").await,
        Err(StoreError::Closed)
    ));
    // closing twice is fine
    store.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_share_tag_and_block() {
    let store = setup_store().await;

    let writers: Vec<_> = (0..32)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let content = format!("note {i} #common");
                let blocks = vec![
                    tagged_block(&content, &["common"], [1.0, i as f32, 0.0]),
                    block("shared line", [0.0, 0.0, 1.0]),
                ];
                store
                    .upsert_blocks(&blocks, &source(&format!("f{i}.md"), 1, 1))
                    .await?;
                store
                    .upsert_tag_links(&[(content, "common".to_string())])
                    .await
            })
        })
        .collect();

    for writer in writers {
        writer.await.unwrap().unwrap();
    }

    assert_eq!(store.blocks_tagged("common").await.unwrap().len(), 32);
    assert_eq!(store.block_count().await.unwrap(), 33);
    assert!(store.block_by_content("shared line").await.unwrap().is_some());
}
