//! Corpus discovery

use notegraph_config::SourceConfig;
use notegraph_core::{SyncError, SyncResult};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Every file matched by the configured sources, sorted and deduplicated.
///
/// Missing roots are logged and skipped; an invalid glob pattern is a
/// configuration error.
pub fn discover_files(sources: &BTreeMap<String, SourceConfig>) -> SyncResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for (name, source) in sources {
        if !source.path.is_dir() {
            warn!(
                "Source '{}' root {} does not exist, skipping",
                name,
                source.path.display()
            );
            continue;
        }

        let expression = source.glob_expression();
        let entries = glob::glob(&expression).map_err(|e| {
            SyncError::Configuration(format!(
                "invalid pattern '{}' for source '{}': {}",
                source.pattern, name, e
            ))
        })?;

        let before = files.len();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("Cannot read {}: {}", e.path().display(), e.error()),
            }
        }
        debug!("Source '{}': {} files", name, files.len() - before);
    }

    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sources(entries: &[(&str, SourceConfig)]) -> BTreeMap<String, SourceConfig> {
        entries
            .iter()
            .map(|(name, source)| (name.to_string(), source.clone()))
            .collect()
    }

    #[test]
    fn test_discovers_sorted_markdown_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.md"), "- b").unwrap();
        std::fs::write(dir.path().join("sub/a.md"), "- a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "- not markdown").unwrap();

        let files = discover_files(&sources(&[("notes", SourceConfig::new(dir.path()))])).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("b.md"), dir.path().join("sub/a.md")]
        );
    }

    #[test]
    fn test_overlapping_sources_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.md"), "- a").unwrap();

        let files = discover_files(&sources(&[
            ("one", SourceConfig::new(dir.path())),
            ("two", SourceConfig::new(dir.path())),
        ]))
        .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_missing_root_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.md"), "- a").unwrap();

        let files = discover_files(&sources(&[
            ("gone", SourceConfig::new(dir.path().join("missing"))),
            ("here", SourceConfig::new(dir.path())),
        ]))
        .unwrap();
        assert_eq!(files, vec![dir.path().join("a.md")]);
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let source = SourceConfig {
            path: dir.path().to_path_buf(),
            pattern: "***/[".to_string(),
        };
        let err = discover_files(&sources(&[("bad", source)])).unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
    }
}
