//! SurrealQL statements used by the graph store
//!
//! Data always travels through bound parameters. The only interpolated
//! parts are the KNN operator and result limits, which are rendered from
//! integers by [`crate::SchemaSpec`].

pub(crate) const UPSERT_BLOCKS: &str = r#"
FOR $b IN $blocks {
    UPSERT type::thing('block', $b.key) MERGE {
        key: $b.key,
        content: $b.content,
        level: $b.level,
        tags: $b.tags,
        embedding: $b.embedding,
        source_file: $source.path,
        last_modified: $source.last_modified,
        file_size: $source.file_size
    };
};
"#;

pub(crate) const BLOCK_KEYS_FOR_FILE: &str =
    "SELECT VALUE key FROM block WHERE source_file = $path";

pub(crate) const DELETE_FILE: &str = r#"
LET $doomed = (SELECT VALUE id FROM block WHERE source_file = $path);
DELETE tagged WHERE in INSIDE $doomed;
DELETE similar WHERE in INSIDE $doomed OR out INSIDE $doomed;
DELETE block WHERE source_file = $path;
DELETE source_file WHERE path = $path;
"#;

pub(crate) const EXISTING_KEYS: &str = "SELECT VALUE key FROM block WHERE key INSIDE $keys";

pub(crate) const UPSERT_TAG_LINKS: &str = r#"
FOR $link IN $links {
    LET $tag = type::thing('tag', $link.tag);
    LET $block = type::thing('block', $link.key);
    UPSERT $tag MERGE { name: $link.tag };
    DELETE tagged WHERE in = $block AND out = $tag;
    RELATE $block->tagged->$tag;
};
"#;

pub(crate) const ALL_EMBEDDINGS: &str = "SELECT key, embedding FROM block";

pub(crate) const CLEAR_SIMILAR: &str = "DELETE similar";

pub(crate) const WRITE_SIMILAR: &str = r#"
FOR $e IN $edges {
    LET $from = type::thing('block', $e.from_key);
    LET $to = type::thing('block', $e.to_key);
    DELETE similar WHERE in = $from AND out = $to;
    RELATE $from->similar->$to SET score = $e.score;
};
"#;

pub(crate) const SOURCE_FILES: &str =
    "SELECT path, last_modified, file_size, block_count FROM source_file";

pub(crate) const RECORD_FILE: &str = r#"
UPSERT type::thing('source_file', $path) CONTENT {
    path: $path,
    last_modified: $last_modified,
    file_size: $file_size,
    block_count: $block_count,
    synced_at: $synced_at
};
"#;

pub(crate) const BLOCK_BY_CONTENT: &str =
    "SELECT key, content, tags FROM block WHERE content = $content LIMIT 1";

pub(crate) const BLOCKS_BY_KEYS: &str =
    "SELECT key, content, tags FROM block WHERE key INSIDE $keys ORDER BY content";

pub(crate) const BLOCKS_TAGGED: &str = r#"
SELECT in.key AS key, in.content AS content, in.tags AS tags
FROM tagged
WHERE out = type::thing('tag', $tag)
"#;

pub(crate) const SIMILAR_EDGES: &str = r#"
SELECT in.key AS from_key, out.key AS to_key, score
FROM similar
WHERE in.key INSIDE $keys OR out.key INSIDE $keys
"#;

pub(crate) const BLOCK_COUNT: &str = "SELECT count() AS count FROM block GROUP ALL";

pub(crate) const SCHEMA_META: &str =
    "SELECT VALUE signature FROM schema_meta WHERE name = $name";

pub(crate) const WRITE_SCHEMA_META: &str =
    "UPSERT type::thing('schema_meta', $name) CONTENT { name: $name, signature: $signature }";

/// Vector-index search; `knn` is the rendered `<|k|>` operator
pub(crate) fn knn_search(knn: &str) -> String {
    format!(
        "SELECT key, content, tags, vector::similarity::cosine(embedding, $vector) AS score \
         FROM block WHERE embedding {knn} $vector ORDER BY score DESC"
    )
}

/// Exhaustive cosine ranking, optionally restricted to blocks carrying one
/// of `$tags`
pub(crate) fn brute_force_search(limit: usize, filter_tags: bool) -> String {
    let filter = if filter_tags {
        "WHERE tags CONTAINSANY $tags "
    } else {
        ""
    };
    format!(
        "SELECT key, content, tags, vector::similarity::cosine(embedding, $vector) AS score \
         FROM block {filter}ORDER BY score DESC LIMIT {limit}"
    )
}
