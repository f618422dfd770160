//! Statistics generation from the result database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::storage::{SqliteStorage, StorageResult};
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Total number of result rows
    pub total_records: u64,

    /// Number of distinct URLs among the rows
    pub unique_urls: u64,

    /// Rows per topic, most frequent first
    pub topics: Vec<(String, u64)>,

    /// Rows per crawl depth
    pub depths: BTreeMap<u32, u64>,
}

impl CrawlStatistics {
    /// Rows recorded more than once for the same URL
    pub fn duplicate_records(&self) -> u64 {
        self.total_records.saturating_sub(self.unique_urls)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The result database to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &SqliteStorage) -> StorageResult<CrawlStatistics> {
    Ok(CrawlStatistics {
        total_records: storage.count_records()?,
        unique_urls: storage.count_unique_urls()?,
        topics: storage.get_topic_breakdown()?,
        depths: storage.get_depth_breakdown()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Result rows: {}", stats.total_records);
    println!("  Unique URLs: {}", stats.unique_urls);
    println!("  Repeated rows: {}", stats.duplicate_records());
    println!();

    if !stats.topics.is_empty() {
        println!("Pages by Topic:");
        for (topic, count) in &stats.topics {
            println!("  {}: {} ({:.1}%)", topic, count, percentage(*count, stats.total_records));
        }
        println!();
    }

    if !stats.depths.is_empty() {
        println!("Pages by Depth:");
        for (depth, count) in &stats.depths {
            println!("  {}: {}", depth, count);
        }
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
