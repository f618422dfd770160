//! Crawl coordinator - wires the shipped collaborators into a scheduler
//!
//! This module handles:
//! - Opening the result database
//! - Building the HTTP fetcher, HTML extractor and keyword classifier
//! - Choosing between a fresh start and resuming from a checkpoint
//! - Running the scheduler to a terminal phase

use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::crawler::classifier::KeywordClassifier;
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::parser::HtmlExtractor;
use crate::crawler::processor::PageProcessor;
use crate::crawler::scheduler::{CrawlReport, CrawlScheduler, CrawlStart, SchedulerOptions};
use crate::storage::SqliteStorage;
use crate::CrawlError;
use std::path::Path;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// If a checkpoint exists and `fresh` is false, the crawl resumes from it and
/// `seed` is ignored. The checkpoint file is never removed.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - Absolute URL to start from
/// * `max_depth` - States at this depth or deeper are not processed
/// * `fresh` - Ignore any existing checkpoint
/// * `config_hash` - Hash of the configuration file, stored in checkpoints
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl reached a terminal phase
/// * `Err(CrawlError)` - Setup failed or a checkpoint could not be read or written
pub async fn run_crawl(
    config: &Config,
    seed: &str,
    max_depth: u32,
    fresh: bool,
    config_hash: Option<String>,
) -> Result<CrawlReport, CrawlError> {
    let checkpoints = CheckpointStore::new(&config.crawler.checkpoint_path);
    let start = select_start(&checkpoints, seed, fresh, config_hash.as_deref())?;

    let storage = SqliteStorage::new(
        Path::new(&config.output.database_path),
        &config.output.results_table,
    )?;
    tracing::info!(
        "Writing results to {} (table {})",
        config.output.database_path,
        config.output.results_table
    );

    let processor = PageProcessor::new(
        Arc::new(HttpFetcher::from_config(&config.user_agent)?),
        Arc::new(HtmlExtractor),
        Arc::new(KeywordClassifier::from_config(&config.classifier)),
        Arc::new(storage),
        config.classifier.max_length,
    );

    let options = SchedulerOptions::from_config(config, max_depth, config_hash);
    let mut scheduler = CrawlScheduler::new(Arc::new(processor), checkpoints, options, start);
    scheduler.run().await
}

fn select_start(
    checkpoints: &CheckpointStore,
    seed: &str,
    fresh: bool,
    config_hash: Option<&str>,
) -> Result<CrawlStart, CrawlError> {
    if fresh {
        if checkpoints.exists() {
            tracing::info!(
                "Ignoring checkpoint at {} (fresh crawl)",
                checkpoints.path().display()
            );
        }
        return seed_start(seed);
    }

    match checkpoints.load()? {
        Some(checkpoint) => {
            tracing::info!(
                "Resuming from checkpoint {} ({} pending, {} visited)",
                checkpoints.path().display(),
                checkpoint.pending.len(),
                checkpoint.visited.len()
            );
            if let (Some(saved), Some(current)) = (checkpoint.config_hash.as_deref(), config_hash) {
                if saved != current {
                    tracing::warn!(
                        "Configuration changed since the checkpoint was written ({} -> {})",
                        saved,
                        current
                    );
                }
            }
            Ok(CrawlStart::Resume(checkpoint))
        }
        None => seed_start(seed),
    }
}

fn seed_start(seed: &str) -> Result<CrawlStart, CrawlError> {
    url::Url::parse(seed)?;
    tracing::info!("Starting fresh crawl from {}", seed);
    Ok(CrawlStart::Seed(seed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::Checkpoint;
    use crate::state::{CrawlState, VisitedSet};

    fn store_with_checkpoint(dir: &tempfile::TempDir) -> CheckpointStore {
        let store = CheckpointStore::new(dir.path().join("cp.json"));
        let visited: VisitedSet = ["https://a.example/"].into_iter().collect();
        let pending = vec![CrawlState::seed("https://a.example/")];
        store
            .save(&Checkpoint::new(pending, &visited, Some("old".to_string())))
            .unwrap();
        store
    }

    #[test]
    fn test_resumes_when_checkpoint_present() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_checkpoint(&dir);

        let start = select_start(&store, "https://seed.example/", false, Some("new")).unwrap();
        match start {
            CrawlStart::Resume(checkpoint) => {
                assert_eq!(checkpoint.pending[0].url, "https://a.example/");
            }
            other => panic!("expected resume, got {:?}", other),
        }
        assert!(store.exists());
    }

    #[test]
    fn test_fresh_ignores_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_checkpoint(&dir);

        let start = select_start(&store, "https://seed.example/", true, None).unwrap();
        assert!(matches!(start, CrawlStart::Seed(ref url) if url == "https://seed.example/"));
        assert!(store.exists());
    }

    #[test]
    fn test_seed_without_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("none.json"));

        let start = select_start(&store, "https://seed.example/", false, None).unwrap();
        assert!(matches!(start, CrawlStart::Seed(_)));
    }

    #[test]
    fn test_invalid_seed_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("none.json"));

        let result = select_start(&store, "not a url", false, None);
        assert!(matches!(result, Err(CrawlError::UrlParse(_))));
    }
}
