//! # Notegraph Configuration
//!
//! Type-safe loading and validation of the TOML file that drives a sync run.
//!
//! ## Sections
//!
//! - `[sources.<name>]`: corpus roots and their glob patterns (at least one)
//! - `[embedding]`: provider, model and similarity settings (required)
//! - `[processing]`: batching, worker pools and parser settings (optional)
//! - `[database]`: embedded SurrealDB location and vector index (required)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notegraph_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("notegraph.toml").await?;
//!     println!("{} source roots", config.sources.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod components;
mod config;
mod error;
mod loader;

#[cfg(feature = "test-utils")]
mod test_utils;

pub use components::*;
pub use config::*;
pub use error::*;
pub use loader::*;

#[cfg(feature = "test-utils")]
pub use test_utils::*;
