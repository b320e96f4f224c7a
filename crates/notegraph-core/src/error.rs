//! Error taxonomy shared by the sync engine
//!
//! Only [`SyncError::Configuration`] and [`SyncError::Connectivity`] abort a
//! run. Everything else is scoped to one file via [`SyncError::File`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors from embedding providers and the batch embedder
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("{provider} provider error: {message}")]
    Provider { provider: String, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Provider returned {actual} vectors for a batch of {expected}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Embedding worker pool is not running")]
    PoolClosed,

    #[error("Embedding worker failed: {0}")]
    WorkerFailed(String),
}

impl EmbeddingError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Errors from the graph datastore
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Store connection has been closed")]
    Closed,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure while processing a single file
#[derive(Error, Debug)]
pub enum FileError {
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    #[error("parse failed: {0}")]
    Parse(String),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("store write failed: {0}")]
    Store(#[from] StoreError),
}

/// Errors surfaced by a sync run
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Datastore unreachable: {0}")]
    Connectivity(#[source] StoreError),

    #[error("Failed to process {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: FileError,
    },
}

impl SyncError {
    /// Whether this error aborts the whole run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::File { .. })
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
