//! Topic-Crawler: a depth-bounded breadth-first topic crawler
//!
//! This crate crawls outward from a seed URL one depth level at a time,
//! classifies the topic of every page it visits, appends one result row per
//! page to a SQLite database, and writes a resumable checkpoint whenever a
//! wave of pages reports failures.

pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Topic-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTML extraction error: {0}")]
    Extraction(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] checkpoint::CheckpointError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Crawl halted: {failed} page(s) failed; checkpoint written to {}",
        checkpoint.display()
    )]
    HaltedOnFailure { failed: usize, checkpoint: PathBuf },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Topic-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use checkpoint::{Checkpoint, CheckpointStore};
pub use config::Config;
pub use crawler::{run_crawl, CrawlReport, CrawlScheduler, PageProcessor};
pub use state::{CrawlPhase, CrawlState, FailureQueue, VisitedSet};
