//! Deterministic collaborators for crawler tests
//!
//! Pages are an in-memory link graph. The "raw content" of a page is its
//! outbound links, one per line, which [`LinkListExtractor`] turns back into
//! features.

use crate::crawler::classifier::TopicClassifier;
use crate::crawler::features::PageFeatures;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::FeatureExtractor;
use crate::storage::{PageRecord, ResultSink, StorageError, StorageResult};
use crate::CrawlError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One completed fetch, with wall-clock bounds
#[derive(Debug, Clone)]
pub struct FetchEvent {
    pub url: String,
    pub started: Instant,
    pub finished: Instant,
}

#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    fail_once: Mutex<HashSet<String>>,
    panicking: HashSet<String>,
    delay: Duration,
    events: Mutex<Vec<FetchEvent>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page linking to `links`
    pub fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.pages
            .insert(url.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Makes every fetch of `url` fail
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Makes only the first fetch of `url` fail
    pub fn fail_once(self, url: &str) -> Self {
        self.fail_once
            .lock()
            .unwrap()
            .insert(url.to_string());
        self
    }

    /// Makes fetching `url` panic
    pub fn panicking(mut self, url: &str) -> Self {
        self.panicking.insert(url.to_string());
        self
    }

    /// Holds every fetch open for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn events(&self) -> Vec<FetchEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.url).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, CrawlError> {
        let started = Instant::now();
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        tokio::task::yield_now().await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(FetchEvent {
            url: url.to_string(),
            started,
            finished: Instant::now(),
        });

        if self.panicking.contains(url) {
            panic!("fetcher panicked on {url}");
        }
        if self.failing.contains(url) || self.fail_once.lock().unwrap().remove(url) {
            return Err(CrawlError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("injected failure for {url}"),
            )));
        }

        match self.pages.get(url) {
            Some(links) => Ok(links.join("\n")),
            None => Err(CrawlError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such page {url}"),
            ))),
        }
    }
}

/// Reads one link per non-empty line
pub struct LinkListExtractor;

impl FeatureExtractor for LinkListExtractor {
    fn extract(&self, raw: &str) -> Result<PageFeatures, CrawlError> {
        Ok(PageFeatures {
            title: raw.lines().next().unwrap_or_default().to_string(),
            links: raw
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            body_text: raw.to_string(),
            ..PageFeatures::default()
        })
    }
}

/// Always answers with the same label, or always fails
pub struct FixedClassifier {
    label: Option<String>,
}

impl FixedClassifier {
    pub fn new(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { label: None }
    }
}

impl TopicClassifier for FixedClassifier {
    fn classify(&self, _text: &str, _max_length: usize) -> Result<String, CrawlError> {
        self.label
            .clone()
            .ok_or_else(|| CrawlError::Classification("injected failure".to_string()))
    }
}

#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<PageRecord>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<PageRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.url).collect()
    }
}

impl ResultSink for MemorySink {
    fn insert(&self, record: &PageRecord) -> StorageResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct FailingSink;

impl ResultSink for FailingSink {
    fn insert(&self, _record: &PageRecord) -> StorageResult<()> {
        Err(StorageError::Database("injected failure".to_string()))
    }
}
