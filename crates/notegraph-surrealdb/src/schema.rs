//! Schema definition
//!
//! Identifiers cannot be bound as parameters, so every name rendered into a
//! statement is checked against `^[A-Za-z_][A-Za-z0-9_]*$` when the
//! [`SchemaSpec`] is built. Dimensions are integers and the distance and
//! index kind are enums, so nothing user-supplied reaches the template as
//! free text.

use notegraph_config::{is_identifier, NotegraphConfig, VectorDistance, VectorIndexKind};
use notegraph_core::{StoreError, StoreResult};

/// Tables, relations and uniqueness constraints. Every statement is
/// `IF NOT EXISTS`, so the block is safe to run on every startup.
const BASE_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS block SCHEMALESS;
DEFINE INDEX IF NOT EXISTS block_content ON TABLE block FIELDS content UNIQUE;
DEFINE INDEX IF NOT EXISTS block_source ON TABLE block FIELDS source_file;

DEFINE TABLE IF NOT EXISTS tag SCHEMALESS;
DEFINE INDEX IF NOT EXISTS tag_name ON TABLE tag FIELDS name UNIQUE;

DEFINE TABLE IF NOT EXISTS source_file SCHEMALESS;
DEFINE INDEX IF NOT EXISTS source_file_path ON TABLE source_file FIELDS path UNIQUE;

DEFINE TABLE IF NOT EXISTS tagged TYPE RELATION IN block OUT tag SCHEMALESS;
DEFINE INDEX IF NOT EXISTS tagged_pair ON TABLE tagged FIELDS in, out UNIQUE;

DEFINE TABLE IF NOT EXISTS similar TYPE RELATION IN block OUT block SCHEMALESS;
DEFINE INDEX IF NOT EXISTS similar_pair ON TABLE similar FIELDS in, out UNIQUE;

DEFINE TABLE IF NOT EXISTS schema_meta SCHEMALESS;
"#;

/// HNSW candidate list size used for KNN queries
const HNSW_EF: usize = 40;

/// Validated vector index definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSpec {
    index_name: String,
    dimension: usize,
    distance: VectorDistance,
    kind: VectorIndexKind,
}

impl SchemaSpec {
    pub fn new(
        index_name: impl Into<String>,
        dimension: usize,
        distance: VectorDistance,
        kind: VectorIndexKind,
    ) -> StoreResult<Self> {
        let index_name = index_name.into();
        if !is_identifier(&index_name) {
            return Err(StoreError::InvalidIdentifier(index_name));
        }
        if dimension == 0 {
            return Err(StoreError::Schema(
                "vector index dimension must be positive".to_string(),
            ));
        }
        Ok(Self {
            index_name,
            dimension,
            distance,
            kind,
        })
    }

    /// MTREE cosine index
    pub fn cosine(index_name: impl Into<String>, dimension: usize) -> StoreResult<Self> {
        Self::new(
            index_name,
            dimension,
            VectorDistance::Cosine,
            VectorIndexKind::Mtree,
        )
    }

    pub fn from_config(config: &NotegraphConfig) -> StoreResult<Self> {
        let index = &config.database.vector_index;
        Self::new(
            index.name.clone(),
            config.index_dimension(),
            index.distance,
            index.kind,
        )
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn distance(&self) -> VectorDistance {
        self.distance
    }

    pub fn kind(&self) -> VectorIndexKind {
        self.kind
    }

    pub(crate) fn base_statements(&self) -> &'static str {
        BASE_SCHEMA
    }

    /// `DEFINE INDEX` for the block embedding
    pub fn vector_index_statement(&self) -> String {
        let structure = match self.kind {
            VectorIndexKind::Mtree => "MTREE",
            VectorIndexKind::Hnsw => "HNSW",
        };
        format!(
            "DEFINE INDEX IF NOT EXISTS {} ON TABLE block FIELDS embedding {} DIMENSION {} DIST {};",
            self.index_name,
            structure,
            self.dimension,
            self.distance.keyword()
        )
    }

    /// Drop the vector index so it can be redefined
    pub fn remove_index_statement(&self) -> String {
        format!(
            "REMOVE INDEX IF EXISTS {} ON TABLE block;",
            self.index_name
        )
    }

    /// KNN operator for `limit` neighbours, e.g. `<|10|>`
    pub fn knn_operator(&self, limit: usize) -> String {
        match self.kind {
            VectorIndexKind::Mtree => format!("<|{}|>", limit),
            VectorIndexKind::Hnsw => format!("<|{},{}|>", limit, HNSW_EF.max(limit)),
        }
    }

    /// Fingerprint stored in `schema_meta` to detect definition changes
    pub(crate) fn signature(&self) -> String {
        format!(
            "{}:{:?}:{}:{}",
            self.index_name,
            self.kind,
            self.dimension,
            self.distance.keyword()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_mtree_index() {
        let spec = SchemaSpec::cosine("block_embedding", 768).unwrap();
        assert_eq!(
            spec.vector_index_statement(),
            "DEFINE INDEX IF NOT EXISTS block_embedding ON TABLE block FIELDS embedding MTREE DIMENSION 768 DIST COSINE;"
        );
        assert_eq!(spec.knn_operator(5), "<|5|>");
    }

    #[test]
    fn test_renders_hnsw_index() {
        let spec = SchemaSpec::new(
            "vec_idx",
            4,
            VectorDistance::Euclidean,
            VectorIndexKind::Hnsw,
        )
        .unwrap();
        assert!(spec
            .vector_index_statement()
            .ends_with("embedding HNSW DIMENSION 4 DIST EUCLIDEAN;"));
        assert_eq!(spec.knn_operator(5), "<|5,40|>");
        assert_eq!(spec.knn_operator(100), "<|100,100|>");
    }

    #[test]
    fn test_rejects_injected_index_name() {
        for name in [
            "idx; REMOVE TABLE block",
            "idx ON TABLE tag",
            "1idx",
            "",
            "idx-name",
        ] {
            assert!(
                matches!(
                    SchemaSpec::cosine(name, 8),
                    Err(StoreError::InvalidIdentifier(_))
                ),
                "accepted {name:?}"
            );
        }
    }

    #[test]
    fn test_rejects_zero_dimension() {
        assert!(matches!(
            SchemaSpec::cosine("idx", 0),
            Err(StoreError::Schema(_))
        ));
    }

    #[test]
    fn test_signature_tracks_dimension() {
        let a = SchemaSpec::cosine("idx", 8).unwrap();
        let b = SchemaSpec::cosine("idx", 16).unwrap();
        assert_ne!(a.signature(), b.signature());
        assert_eq!(a.signature(), a.clone().signature());
    }
}
