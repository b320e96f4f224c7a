//! Cheap file-revision fingerprints

use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::time::UNIX_EPOCH;

/// Modification time and byte size of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileSignature {
    /// Nanoseconds since the Unix epoch
    pub modified_ns: i64,
    /// Size in bytes
    pub size: u64,
}

impl FileSignature {
    pub fn new(modified_ns: i64, size: u64) -> Self {
        Self { modified_ns, size }
    }

    /// Read the signature from filesystem metadata
    pub fn from_metadata(metadata: &Metadata) -> std::io::Result<Self> {
        let modified = metadata.modified()?;
        let modified_ns = match modified.duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
            Err(e) => -i64::try_from(e.duration().as_nanos()).unwrap_or(i64::MAX),
        };
        Ok(Self {
            modified_ns,
            size: metadata.len(),
        })
    }
}

/// Signature recorded in the store after a file was fully written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSignature {
    pub signature: FileSignature,
    /// Blocks written for the file in that run
    pub block_count: usize,
}
