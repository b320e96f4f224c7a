//! notegraph command-line glue
//!
//! The binary parses arguments, opens the configured store and embedder,
//! runs one command and closes both again. All behaviour lives in the
//! library crates; this crate only wires them together and prints results.

pub mod cli;
pub mod commands;
pub mod output;
pub mod services;

pub use services::Services;
