//! Block data model

use crate::signature::FileSignature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable identity of a block, derived from its content.
///
/// Identical text always maps to the same key, so merge-by-content and
/// merge-by-key are the same operation. Keys also give the total order used
/// to evaluate each unordered block pair once.
pub fn block_key(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// One list-item line of a note, before embedding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBlock {
    /// Text after the list marker, trimmed
    pub content: String,
    /// Nesting depth derived from indentation
    pub level: usize,
    /// Hashtags and wiki-link targets, case preserved
    pub tags: BTreeSet<String>,
}

impl ParsedBlock {
    pub fn new(content: impl Into<String>, level: usize) -> Self {
        Self {
            content: content.into(),
            level,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn key(&self) -> String {
        block_key(&self.content)
    }
}

/// A parsed block paired with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedBlock {
    pub block: ParsedBlock,
    pub embedding: Vec<f32>,
}

impl EmbeddedBlock {
    pub fn new(block: ParsedBlock, embedding: Vec<f32>) -> Self {
        Self { block, embedding }
    }

    pub fn key(&self) -> String {
        self.block.key()
    }

    pub fn content(&self) -> &str {
        &self.block.content
    }
}

/// File attribution written onto every block of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub path: String,
    pub signature: FileSignature,
}

impl SourceMetadata {
    pub fn new(path: impl Into<String>, signature: FileSignature) -> Self {
        Self {
            path: path.into(),
            signature,
        }
    }
}
