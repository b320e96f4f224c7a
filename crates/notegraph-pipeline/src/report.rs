//! Sync run summary

use notegraph_core::SyncError;
use std::fmt;
use std::time::Duration;

/// Counters and per-file failures of one sync run
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Files matched by the configured sources
    pub discovered: usize,
    /// Changed files processed successfully
    pub processed: usize,
    /// Files skipped because their signature was unchanged
    pub skipped: usize,
    /// Files whose processing or removal failed
    pub failed: usize,
    /// Recorded files no longer present, whose blocks were deleted
    pub removed: usize,
    pub blocks_written: usize,
    pub similar_edges: usize,
    /// One `SyncError::File` per failed file
    pub failures: Vec<SyncError>,
    pub duration: Duration,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} discovered, {} processed, {} skipped, {} removed, {} failed; \
             {} blocks written, {} similar edges in {:.2?}",
            self.discovered,
            self.processed,
            self.skipped,
            self.removed,
            self.failed,
            self.blocks_written,
            self.similar_edges,
            self.duration
        )
    }
}
