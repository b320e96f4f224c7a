//! # Notegraph SurrealDB Backend
//!
//! Embedded SurrealDB implementation of [`GraphStore`] and [`GraphReader`].
//!
//! ## Graph layout
//!
//! - `block`: one record per distinct content, id = BLAKE3 of the content
//! - `tag`: one record per tag name, id = the name
//! - `tagged`: relation `block -> tag`
//! - `similar`: relation `block -> block` carrying `score`, from lower to higher key
//! - `source_file`: per-file commit marker holding the recorded signature
//!
//! ## Usage
//!
//! ```rust,no_run
//! use notegraph_core::GraphStore;
//! use notegraph_surrealdb::{SurrealClient, SurrealGraphStore, SchemaSpec};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SurrealClient::new_memory().await?;
//!     let store = SurrealGraphStore::new(client, SchemaSpec::cosine("block_embedding", 768)?);
//!     store.ensure_schema().await?;
//!     store.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! [`GraphStore`]: notegraph_core::GraphStore
//! [`GraphReader`]: notegraph_core::GraphReader

pub mod graph_store;
mod queries;
pub mod schema;
pub mod surreal_client;
pub mod types;

pub use graph_store::SurrealGraphStore;
pub use schema::SchemaSpec;
pub use surreal_client::SurrealClient;
pub use types::SurrealDbConfig;
