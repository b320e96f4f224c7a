//! Processing and concurrency settings

use serde::{Deserialize, Serialize};

/// How embedding workers are executed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PoolStrategy {
    /// Workers are tokio tasks on the shared runtime
    #[default]
    Tasks,
    /// Workers are dedicated OS threads, each with its own current-thread runtime
    Threads,
}

/// When SIMILAR edges are rebuilt during a sync
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMode {
    /// Compare only blocks written in this run against the corpus
    #[default]
    Incremental,
    /// Recompute every pair after each sync
    Full,
    /// Leave edges untouched
    Off,
}

/// `[processing]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Texts per batch submitted to a single worker
    #[serde(default = "default_batch_size")]
    pub embedding_batch_size: usize,
    /// Size of the embedding worker pool
    #[serde(default = "default_workers")]
    pub embedding_workers: usize,
    /// Worker execution strategy
    #[serde(default)]
    pub strategy: PoolStrategy,
    /// Files processed concurrently
    #[serde(default = "default_file_workers")]
    pub file_workers: usize,
    /// Whitespace characters per nesting level
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
    /// Similarity edge maintenance after a sync
    #[serde(default)]
    pub similarity_mode: SimilarityMode,
}

fn default_batch_size() -> usize {
    32
}

fn default_workers() -> usize {
    num_cpus::get().max(1)
}

fn default_file_workers() -> usize {
    (num_cpus::get() / 2).max(1)
}

fn default_indent_width() -> usize {
    4
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            embedding_batch_size: default_batch_size(),
            embedding_workers: default_workers(),
            strategy: PoolStrategy::default(),
            file_workers: default_file_workers(),
            indent_width: default_indent_width(),
            similarity_mode: SimilarityMode::default(),
        }
    }
}
