use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A node in the crawl graph
///
/// States are never mutated after construction; following a link produces a
/// new state one level deeper via [`CrawlState::successor`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrawlState {
    /// Target to process (not guaranteed to be a valid URL)
    pub url: String,

    /// The page that linked here; `None` for the seed
    pub source_url: Option<String>,

    /// Breadth-first distance from the seed
    pub depth: u32,
}

impl CrawlState {
    /// Creates the depth-0 state for a seed URL
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source_url: None,
            depth: 0,
        }
    }

    /// Creates the state reached by following `link` from this page
    pub fn successor(&self, link: impl Into<String>) -> Self {
        Self {
            url: link.into(),
            source_url: Some(self.url.clone()),
            depth: self.depth + 1,
        }
    }
}

/// The set of URLs ever admitted into a frontier
///
/// Grows monotonically for the whole crawl and is carried across restarts
/// through the checkpoint.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a URL, returning `true` if it was not already present
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.urls.iter()
    }

    /// Returns the URLs in sorted order, as written to checkpoints
    pub fn to_sorted(&self) -> BTreeSet<String> {
        self.urls.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for VisitedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_has_no_source() {
        let seed = CrawlState::seed("https://example.com/");
        assert_eq!(seed.depth, 0);
        assert_eq!(seed.source_url, None);
    }

    #[test]
    fn test_successor_is_one_level_deeper() {
        let parent = CrawlState {
            url: "https://example.com/a".to_string(),
            source_url: Some("https://example.com/".to_string()),
            depth: 3,
        };
        let child = parent.successor("https://example.com/b");

        assert_eq!(child.url, "https://example.com/b");
        assert_eq!(child.source_url.as_deref(), Some("https://example.com/a"));
        assert_eq!(child.depth, parent.depth + 1);
    }

    #[test]
    fn test_visited_insert_reports_novelty() {
        let mut visited = VisitedSet::new();
        assert!(visited.insert("https://a.example/"));
        assert!(!visited.insert("https://a.example/"));
        assert_eq!(visited.len(), 1);
        assert!(visited.contains("https://a.example/"));
        assert!(!visited.contains("https://b.example/"));
    }

    #[test]
    fn test_visited_sorted_snapshot() {
        let visited: VisitedSet = ["https://c.example/", "https://a.example/", "https://b.example/"]
            .into_iter()
            .collect();
        let sorted: Vec<_> = visited.to_sorted().into_iter().collect();
        assert_eq!(
            sorted,
            vec![
                "https://a.example/".to_string(),
                "https://b.example/".to_string(),
                "https://c.example/".to_string()
            ]
        );
    }
}
