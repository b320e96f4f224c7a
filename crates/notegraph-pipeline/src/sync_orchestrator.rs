//! Sync orchestrator
//!
//! Coordinates one pass of change detection, parsing, embedding and graph
//! writes. All services are injected, so the same orchestrator runs against
//! SurrealDB in production and the in-memory store in tests.
//!
//! Files are processed concurrently on a bounded stream (`file_workers`);
//! within one file the steps run strictly in order. The file's commit marker
//! is written last, so a file that fails half-way has no recorded signature
//! and is picked up again by the next run.

use crate::discovery::discover_files;
use crate::report::SyncReport;
use crate::signature_tracker::{path_key, SignatureTracker};
use futures::stream::{self, StreamExt};
use notegraph_config::{NotegraphConfig, SimilarityMode, SourceConfig};
use notegraph_core::{
    BatchEmbedder, EmbeddedBlock, EmbeddingError, FileError, GraphStore, ParsedBlock,
    SourceMetadata, StoreResult, SyncError, SyncResult,
};
use notegraph_parser::{BlockParser, ParseError};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// What one successfully processed file contributed
#[derive(Debug, Default)]
struct FileOutcome {
    blocks: usize,
    contents: Vec<String>,
}

pub struct SyncOrchestrator {
    store: Arc<dyn GraphStore>,
    embedder: Arc<dyn BatchEmbedder>,
    parser: BlockParser,
    sources: BTreeMap<String, SourceConfig>,
    file_workers: usize,
    similarity_threshold: f32,
    similarity_mode: SimilarityMode,
}

impl SyncOrchestrator {
    pub fn new(
        config: &NotegraphConfig,
        store: Arc<dyn GraphStore>,
        embedder: Arc<dyn BatchEmbedder>,
    ) -> Self {
        Self {
            store,
            embedder,
            parser: BlockParser::new(config.processing.indent_width),
            sources: config.sources.clone(),
            file_workers: config.processing.file_workers.max(1),
            similarity_threshold: config.embedding.similarity_threshold,
            similarity_mode: config.processing.similarity_mode,
        }
    }

    /// Run one sync pass.
    ///
    /// Returns `Err` only for configuration and connectivity failures;
    /// per-file failures are collected in the report.
    pub async fn sync(&self) -> SyncResult<SyncReport> {
        let started = Instant::now();

        self.store.ping().await.map_err(SyncError::Connectivity)?;
        self.store
            .ensure_schema()
            .await
            .map_err(SyncError::Connectivity)?;

        let files = discover_files(&self.sources)?;
        let tracker = SignatureTracker::load(self.store.as_ref())
            .await
            .map_err(SyncError::Connectivity)?;
        let diff = tracker.files_needing_sync(&files).await;

        let mut report = SyncReport {
            discovered: files.len(),
            skipped: diff.unchanged.len(),
            ..SyncReport::default()
        };
        info!(
            "Sync: {} files, {} changed, {} unchanged, {} removed",
            files.len(),
            diff.changed.len(),
            diff.unchanged.len(),
            diff.removed.len()
        );

        for path in &diff.removed {
            match self.store.delete_blocks_for_file(path).await {
                Ok(count) => {
                    debug!("Removed {} blocks of deleted file {}", count, path);
                    report.removed += 1;
                }
                Err(e) => {
                    warn!("Failed to remove blocks of {}: {}", path, e);
                    report.failed += 1;
                    report.failures.push(SyncError::File {
                        path: PathBuf::from(path),
                        source: e.into(),
                    });
                }
            }
        }

        let outcomes: Vec<(PathBuf, Result<FileOutcome, FileError>)> =
            stream::iter(diff.changed)
                .map(|path| async move {
                    let outcome = self.process_file(&path).await;
                    (path, outcome)
                })
                .buffer_unordered(self.file_workers)
                .collect()
                .await;

        let mut touched = Vec::new();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(outcome) => {
                    report.processed += 1;
                    report.blocks_written += outcome.blocks;
                    touched.extend(outcome.contents);
                }
                Err(e) => {
                    error!("Failed to process {}: {}", path.display(), e);
                    report.failed += 1;
                    report.failures.push(SyncError::File { path, source: e });
                }
            }
        }

        let corpus_changed = report.processed > 0 || report.removed > 0;
        report.similar_edges = match self.link(&touched, corpus_changed).await {
            Ok(edges) => edges,
            Err(e) => {
                error!("Similarity linking failed: {}", e);
                0
            }
        };

        report.duration = started.elapsed();
        info!("Sync finished: {}", report);
        Ok(report)
    }

    /// Recompute every SIMILAR edge over the whole corpus
    pub async fn relink(&self) -> SyncResult<usize> {
        self.store.ping().await.map_err(SyncError::Connectivity)?;
        let edges = self
            .store
            .link_similar(self.similarity_threshold)
            .await
            .map_err(SyncError::Connectivity)?;
        info!("Relinked corpus: {} similar edges", edges);
        Ok(edges)
    }

    async fn link(&self, touched: &[String], corpus_changed: bool) -> StoreResult<usize> {
        match self.similarity_mode {
            SimilarityMode::Off => Ok(0),
            SimilarityMode::Full if corpus_changed => {
                self.store.link_similar(self.similarity_threshold).await
            }
            SimilarityMode::Full => Ok(0),
            SimilarityMode::Incremental if touched.is_empty() => Ok(0),
            SimilarityMode::Incremental => {
                self.store
                    .link_similar_for(touched, self.similarity_threshold)
                    .await
            }
        }
    }

    async fn process_file(&self, path: &Path) -> Result<FileOutcome, FileError> {
        let key = path_key(path);
        // captured before reading so a concurrent edit is caught next run
        let signature = SignatureTracker::signature(path).await?;

        self.store.delete_blocks_for_file(&key).await?;

        let parsed = self.parser.parse_file(path).await.map_err(|e| match e {
            ParseError::Io { source, .. } => FileError::Read(source),
            other => FileError::Parse(other.to_string()),
        })?;
        let blocks = merge_duplicates(parsed.blocks);
        let source = SourceMetadata::new(key, signature);

        if blocks.is_empty() {
            self.store.record_file(&source, 0).await?;
            debug!("{}: no blocks", path.display());
            return Ok(FileOutcome::default());
        }

        let contents: Vec<String> = blocks.iter().map(|b| b.content.clone()).collect();
        let vectors = self.embedder.embed(contents.clone()).await?;
        if vectors.len() != blocks.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: blocks.len(),
                actual: vectors.len(),
            }
            .into());
        }

        let tag_links: Vec<(String, String)> = blocks
            .iter()
            .flat_map(|b| b.tags.iter().map(|t| (b.content.clone(), t.clone())))
            .collect();
        let embedded: Vec<EmbeddedBlock> = blocks
            .into_iter()
            .zip(vectors)
            .map(|(block, vector)| EmbeddedBlock::new(block, vector))
            .collect();

        let written = self.store.upsert_blocks(&embedded, &source).await?;
        self.store.upsert_tag_links(&tag_links).await?;
        self.store.record_file(&source, written).await?;

        debug!(
            "{}: {} blocks, {} tag links",
            path.display(),
            written,
            tag_links.len()
        );
        Ok(FileOutcome {
            blocks: written,
            contents,
        })
    }
}

/// Collapse repeated contents within one file, keeping the first level and
/// the union of tags
fn merge_duplicates(blocks: Vec<ParsedBlock>) -> Vec<ParsedBlock> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<ParsedBlock> = Vec::with_capacity(blocks.len());

    for block in blocks {
        match index.get(&block.content) {
            Some(&i) => merged[i].tags.extend(block.tags),
            None => {
                index.insert(block.content.clone(), merged.len());
                merged.push(block);
            }
        }
    }
    merged
}
