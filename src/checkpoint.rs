//! Checkpoint persistence
//!
//! A checkpoint captures the crawl's pending frontier and visited set when a
//! wave halts on failure, so the next run can resume instead of starting
//! again from the seed.
//!
//! Checkpoints are versioned JSON documents written atomically (temporary
//! file, then rename). Loading never removes the file: a run started while a
//! checkpoint exists resumes from it, every time, until it is deleted or the
//! crawl is started with `--fresh`.

use crate::state::{CrawlState, VisitedSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Current checkpoint format version
pub const CHECKPOINT_VERSION: u32 = 1;

/// Errors that can occur while reading or writing checkpoints
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to access checkpoint {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed checkpoint {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unsupported checkpoint version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// A durable snapshot of the pending frontier and visited set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    /// Hash of the configuration file the crawl ran with, if any
    #[serde(default)]
    pub config_hash: Option<String>,
    /// Next wave's frontier followed by the states that failed
    pub pending: Vec<CrawlState>,
    pub visited: BTreeSet<String>,
}

impl Checkpoint {
    pub fn new(pending: Vec<CrawlState>, visited: &VisitedSet, config_hash: Option<String>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            created_at: Utc::now(),
            config_hash,
            pending,
            visited: visited.to_sorted(),
        }
    }

    /// Rebuilds the visited set recorded in this checkpoint
    pub fn visited_set(&self) -> VisitedSet {
        self.visited.iter().cloned().collect()
    }
}

/// Reads and writes the checkpoint at a fixed location
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes a checkpoint, replacing any previous one
    pub fn save(&self, checkpoint: &Checkpoint) -> CheckpointResult<()> {
        info!(
            "Saving checkpoint to {} ({} pending, {} visited)",
            self.path.display(),
            checkpoint.pending.len(),
            checkpoint.visited.len()
        );

        let encoded =
            serde_json::to_vec_pretty(checkpoint).map_err(|source| CheckpointError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, encoded).map_err(|source| CheckpointError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| CheckpointError::Io {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }

    /// Loads the checkpoint if one exists
    ///
    /// Returns `Ok(None)` when there is no checkpoint file.
    pub fn load(&self) -> CheckpointResult<Option<Checkpoint>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No checkpoint at {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(CheckpointError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let checkpoint: Checkpoint =
            serde_json::from_slice(&bytes).map_err(|source| CheckpointError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: checkpoint.version,
                expected: CHECKPOINT_VERSION,
            });
        }

        Ok(Some(checkpoint))
    }
}
