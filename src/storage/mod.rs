//! Storage module for persisting crawl results
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Appending one result record per processed page
//! - Read-back queries used for crawl statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{ResultSink, StorageError, StorageResult};

use serde::Serialize;

/// One processed page, as appended to the results table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    pub url: String,
    pub source_url: Option<String>,
    pub depth: u32,
    pub title: String,
    /// The extracted links, encoded as a JSON array
    pub links: String,
    pub topic: String,
}

impl PageRecord {
    /// Builds a record, encoding `links` as JSON text
    pub fn new(
        url: &str,
        source_url: Option<&str>,
        depth: u32,
        title: &str,
        links: &[String],
        topic: &str,
    ) -> StorageResult<Self> {
        let links = serde_json::to_string(links)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            source_url: source_url.map(str::to_string),
            depth,
            title: title.to_string(),
            links,
            topic: topic.to_string(),
        })
    }
}
