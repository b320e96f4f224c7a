//! Sync orchestration and retrieval
//!
//! This crate coordinates the infrastructure crates; it holds no storage or
//! embedding logic of its own.
//!
//! ## Sync run
//!
//! 1. **Startup**: probe the store and apply the schema (fatal on failure)
//! 2. **Discover**: glob every configured source root
//! 3. **Diff**: compare current file signatures with recorded ones
//! 4. **Remove**: drop blocks of files that disappeared
//! 5. **Process**: per changed file, delete → parse → embed → upsert → tag → record
//! 6. **Link**: SIMILAR edges for the blocks written (or the whole corpus)
//!
//! ## Retrieval
//!
//! [`Retriever`] answers vector, tag-neighbourhood, graph-exploration and
//! hybrid queries against the same store.
//!
//! ```rust,ignore
//! let orchestrator = SyncOrchestrator::new(&config, store.clone(), embedder.clone());
//! let report = orchestrator.sync().await?;
//! println!("{report}");
//!
//! let retriever = Retriever::new(store, embedder);
//! let hits = retriever.find_similar("algorithm complexity", 5).await?;
//! ```

pub mod discovery;
pub mod error;
pub mod report;
pub mod retriever;
pub mod signature_tracker;
pub mod sync_orchestrator;

pub use discovery::discover_files;
pub use error::{RetrievalError, RetrievalResult};
pub use report::SyncReport;
pub use retriever::{
    ExploreHit, HybridHit, RelatedBlock, Relation, Retriever, SimilarBlock,
    DEFAULT_RELATED_LIMIT,
};
pub use signature_tracker::{path_key, DiffResult, SignatureTracker};
pub use sync_orchestrator::SyncOrchestrator;
