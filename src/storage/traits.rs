//! Storage traits and error types
//!
//! This module defines the sink interface the crawler writes results to and
//! the associated error types.

use crate::storage::PageRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable destination for per-page results
///
/// Implementations are called from many workers at once and must serialize
/// access internally if the backend is not safe for concurrent use. A page
/// may be re-inserted after a resumed crawl, so duplicates must be tolerated.
pub trait ResultSink: Send + Sync {
    /// Appends one result record
    fn insert(&self, record: &PageRecord) -> StorageResult<()>;
}
