use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "notegraph.toml";

#[derive(Parser, Debug)]
#[command(name = "notegraph")]
#[command(about = "Semantic block index over note files with graph retrieval")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ./notegraph.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Bring the graph up to date with the configured sources
    Sync,

    /// Recompute similarity edges over the whole corpus
    Relink,

    /// Blocks semantically closest to a query
    Search {
        /// Query text
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Blocks similar to those carrying a tag
    Related {
        /// Tag name, without `#`
        tag: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Walk the graph outward from a block
    Explore {
        /// Exact content of the starting block
        content: String,

        /// Maximum path length in edges
        #[arg(short, long, default_value = "2")]
        depth: usize,
    },

    /// Vector search restricted to tagged blocks
    Hybrid {
        /// Query text
        query: String,

        /// Tag filter, repeatable
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}
