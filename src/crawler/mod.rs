//! Crawler module for wave-based page processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - HTML parsing, feature extraction and text normalization
//! - Topic classification
//! - Per-page processing and failure capture
//! - Depth-synchronous wave scheduling with checkpointing

mod classifier;
mod coordinator;
mod features;
mod fetcher;
mod parser;
mod processor;
mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;

pub use classifier::{truncate_chars, KeywordClassifier, TopicClassifier};
pub use coordinator::run_crawl;
pub use features::{normalize_text, remove_duplicate_words, remove_special_characters, PageFeatures};
pub use fetcher::{build_http_client, user_agent_string, HttpFetcher, PageFetcher};
pub use parser::{is_valid_link, parse_html, FeatureExtractor, HtmlExtractor};
pub use processor::PageProcessor;
pub use scheduler::{CrawlReport, CrawlScheduler, CrawlStart, SchedulerOptions, WaveSummary};
