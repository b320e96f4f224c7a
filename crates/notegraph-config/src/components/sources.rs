//! Corpus source roots

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One corpus root and the glob pattern selecting note files beneath it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Root directory of the corpus
    pub path: PathBuf,
    /// Glob pattern relative to `path`
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

fn default_pattern() -> String {
    "**/*.md".to_string()
}

impl SourceConfig {
    /// Create a source with the default `**/*.md` pattern
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pattern: default_pattern(),
        }
    }

    /// Full glob expression for this source
    pub fn glob_expression(&self) -> String {
        self.path.join(&self.pattern).to_string_lossy().into_owned()
    }
}
