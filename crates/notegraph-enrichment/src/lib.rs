//! Embedding layer for notegraph
//!
//! - [`providers`]: concrete [`EmbeddingProvider`]s (Ollama HTTP, deterministic mock)
//! - [`worker_pool`]: fixed-size pool with an explicit start/submit/shutdown lifecycle
//! - [`batcher`]: chunk/batch splitting with order-preserving reassembly
//!
//! [`EmbeddingProvider`]: notegraph_core::EmbeddingProvider

pub mod batcher;
pub mod providers;
pub mod worker_pool;

pub use batcher::{BatcherSettings, EmbeddingBatcher};
pub use providers::{create_provider, MockEmbeddingProvider, OllamaProvider};
pub use worker_pool::EmbeddingWorkerPool;

pub use notegraph_config::PoolStrategy;
