//! Output module for reporting on crawl results
//!
//! Reads the result database back and summarizes it per topic and per depth.

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};
