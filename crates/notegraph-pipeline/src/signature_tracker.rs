//! Change detection by file signature
//!
//! A file needs sync when its current `(modified_ns, size)` signature differs
//! from the one recorded by its last completed sync, or when nothing is
//! recorded for it. Diffing is a pure query: it never writes to the store.

use notegraph_core::{FileSignature, GraphStore, StoreResult, StoredSignature};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Store key of a file path
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Outcome of comparing the corpus with recorded signatures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// New or modified files, plus files whose metadata could not be read
    pub changed: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    /// Recorded paths no longer present in the corpus
    pub removed: Vec<String>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignatureTracker {
    recorded: HashMap<String, StoredSignature>,
}

impl SignatureTracker {
    pub fn new(recorded: HashMap<String, StoredSignature>) -> Self {
        Self { recorded }
    }

    /// Read recorded signatures from the store
    pub async fn load(store: &dyn GraphStore) -> StoreResult<Self> {
        let recorded = store.stored_signatures().await?;
        debug!("Loaded {} recorded file signatures", recorded.len());
        Ok(Self::new(recorded))
    }

    /// Current signature of a file on disk
    pub async fn signature(path: &Path) -> std::io::Result<FileSignature> {
        let metadata = tokio::fs::metadata(path).await?;
        FileSignature::from_metadata(&metadata)
    }

    pub fn recorded(&self) -> &HashMap<String, StoredSignature> {
        &self.recorded
    }

    /// Split `all_files` into changed and unchanged, and list recorded paths
    /// missing from it
    pub async fn files_needing_sync(&self, all_files: &[PathBuf]) -> DiffResult {
        let mut diff = DiffResult::default();
        let mut present = HashSet::with_capacity(all_files.len());

        for path in all_files {
            let key = path_key(path);
            let current = match Self::signature(path).await {
                Ok(signature) => Some(signature),
                Err(e) => {
                    debug!("Cannot stat {}: {}", path.display(), e);
                    None
                }
            };

            let unchanged = matches!(
                (current, self.recorded.get(&key)),
                (Some(now), Some(stored)) if now == stored.signature
            );
            if unchanged {
                diff.unchanged.push(path.clone());
            } else {
                diff.changed.push(path.clone());
            }
            present.insert(key);
        }

        diff.removed = self
            .recorded
            .keys()
            .filter(|key| !present.contains(*key))
            .cloned()
            .collect();
        diff.removed.sort();

        debug!(
            "Diff: {} changed, {} unchanged, {} removed",
            diff.changed.len(),
            diff.unchanged.len(),
            diff.removed.len()
        );
        diff
    }
}
