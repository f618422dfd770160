//! Per-URL processing: fetch, extract, classify, persist, expand
//!
//! [`PageProcessor::process`] never returns an error. A failure anywhere in
//! the pipeline is logged, the state is pushed onto the shared
//! [`FailureQueue`], and no successors are returned.

use crate::crawler::classifier::TopicClassifier;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::FeatureExtractor;
use crate::state::{CrawlState, FailureQueue};
use crate::storage::{PageRecord, ResultSink};
use crate::CrawlError;
use std::sync::Arc;

/// Runs the per-page pipeline against injected collaborators
pub struct PageProcessor {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn FeatureExtractor>,
    classifier: Arc<dyn TopicClassifier>,
    sink: Arc<dyn ResultSink>,
    max_length: usize,
}

impl PageProcessor {
    /// Creates a processor
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Retrieves raw page content
    /// * `extractor` - Turns content into title, links, metadata and text
    /// * `classifier` - Assigns one topic label to the normalized text
    /// * `sink` - Receives one record per successfully processed page
    /// * `max_length` - Maximum classifier input length
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn FeatureExtractor>,
        classifier: Arc<dyn TopicClassifier>,
        sink: Arc<dyn ResultSink>,
        max_length: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            classifier,
            sink,
            max_length,
        }
    }

    /// Processes one state and returns its successors
    ///
    /// Successors are one per extracted link, unfiltered; visited and depth
    /// filtering belong to the scheduler.
    pub async fn process(&self, state: CrawlState, failures: &FailureQueue) -> Vec<CrawlState> {
        match self.try_process(&state).await {
            Ok(successors) => successors,
            Err(e) => {
                tracing::warn!("Error processing {} (depth {}): {}", state.url, state.depth, e);
                record_failure(failures, state);
                Vec::new()
            }
        }
    }

    async fn try_process(&self, state: &CrawlState) -> Result<Vec<CrawlState>, CrawlError> {
        let raw = self.fetcher.fetch(&state.url).await?;

        let features = self.extractor.extract(&raw)?;
        let feature_string = features.feature_string();

        let topic = self.classifier.classify(&feature_string, self.max_length)?;

        let record = PageRecord::new(
            &state.url,
            state.source_url.as_deref(),
            state.depth,
            &features.title,
            &features.links,
            &topic,
        )?;
        self.sink.insert(&record)?;

        tracing::debug!(
            "Processed {} (depth {}): topic={}, {} links",
            state.url,
            state.depth,
            topic,
            features.links.len()
        );

        Ok(features
            .links
            .into_iter()
            .map(|link| state.successor(link))
            .collect())
    }
}

/// Pushes a failed state, noting when the bounded queue drops it
pub(crate) fn record_failure(failures: &FailureQueue, state: CrawlState) {
    let url = state.url.clone();
    if !failures.push(state) {
        tracing::warn!(
            "Failure queue full (capacity {}); {} will not be retried",
            failures.capacity(),
            url
        );
    }
}
