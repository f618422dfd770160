//! Topic classification
//!
//! The crawler only depends on [`TopicClassifier`]; the shipped
//! [`KeywordClassifier`] scores a fixed label set by keyword hits.

use crate::config::ClassifierConfig;
use crate::CrawlError;
use std::collections::HashSet;

/// Maps normalized page text to exactly one topic label
pub trait TopicClassifier: Send + Sync {
    /// Classifies `text`, considering at most `max_length` characters of it
    fn classify(&self, text: &str, max_length: usize) -> Result<String, CrawlError>;
}

/// A candidate label and the words that count towards it
#[derive(Debug, Clone)]
struct Label {
    name: String,
    terms: HashSet<String>,
}

/// Keyword-voting classifier over a fixed, ordered label set
///
/// Each input word equal to a label's name or one of its keywords scores one
/// point for that label. The highest score wins; ties (including an all-zero
/// score) go to the label configured first.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    labels: Vec<Label>,
}

impl KeywordClassifier {
    /// Builds a classifier from `(label, keywords)` pairs, in tie-break order
    pub fn new<I, K>(labels: I) -> Self
    where
        I: IntoIterator<Item = (String, K)>,
        K: IntoIterator<Item = String>,
    {
        let labels = labels
            .into_iter()
            .map(|(name, keywords)| {
                let mut terms: HashSet<String> =
                    keywords.into_iter().map(|k| k.to_lowercase()).collect();
                terms.insert(name.to_lowercase());
                Label { name, terms }
            })
            .collect();

        Self { labels }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(
            config
                .labels
                .iter()
                .map(|label| (label.name.clone(), label.keywords.clone())),
        )
    }

    /// Configured label names, in tie-break order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.name.as_str())
    }
}

impl TopicClassifier for KeywordClassifier {
    fn classify(&self, text: &str, max_length: usize) -> Result<String, CrawlError> {
        let text = truncate_chars(text, max_length);

        let mut best: Option<(&Label, usize)> = None;
        for label in &self.labels {
            let score = text
                .split_whitespace()
                .filter(|word| label.terms.contains(&word.to_lowercase()))
                .count();
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((label, score));
            }
        }

        best.map(|(label, _)| label.name.clone())
            .ok_or_else(|| CrawlError::Classification("no candidate labels configured".to_string()))
    }
}

/// Returns at most the first `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
