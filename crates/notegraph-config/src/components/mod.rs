//! Configuration components, one per TOML section

pub mod database;
pub mod embedding;
pub mod processing;
pub mod sources;

pub use database::*;
pub use embedding::*;
pub use processing::*;
pub use sources::*;
