use crate::state::DEFAULT_FAILURE_CAPACITY;
use serde::Deserialize;

/// Main configuration structure for Topic-Crawler
///
/// Every section is optional; missing sections fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of pages processed concurrently within a wave
    ///
    /// Defaults to one less than the number of cores, minimum 1.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Maximum number of failed pages remembered per crawl
    #[serde(rename = "failure-queue-capacity", default = "default_failure_capacity")]
    pub failure_queue_capacity: usize,

    /// Admit each URL at most once per wave
    #[serde(rename = "dedupe-frontier", default)]
    pub dedupe_frontier: bool,

    /// Where the resume checkpoint is written
    #[serde(rename = "checkpoint-path", default = "default_checkpoint_path")]
    pub checkpoint_path: String,
}

impl CrawlerConfig {
    /// Resolves the worker count, sizing from the core count when unset
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get().saturating_sub(1))
            .max(1)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: None,
            failure_queue_capacity: default_failure_capacity(),
            dedupe_frontier: false,
            checkpoint_path: default_checkpoint_path(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default = "default_contact_email")]
    pub contact_email: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
            contact_email: default_contact_email(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite results database
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Table that receives one row per processed page
    #[serde(rename = "results-table", default = "default_results_table")]
    pub results_table: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            results_table: default_results_table(),
        }
    }
}

/// Topic classifier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Maximum number of characters handed to the classifier
    #[serde(rename = "max-length", default = "default_max_length")]
    pub max_length: usize,

    /// Candidate topic labels, in tie-break order
    #[serde(default = "default_labels")]
    pub labels: Vec<LabelEntry>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            labels: default_labels(),
        }
    }
}

/// A candidate topic and the words that vote for it
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEntry {
    pub name: String,

    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_failure_capacity() -> usize {
    DEFAULT_FAILURE_CAPACITY
}

fn default_checkpoint_path() -> String {
    "last_crash_checkpoint.json".to_string()
}

fn default_crawler_name() -> String {
    "topic-crawler".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://example.com/crawler".to_string()
}

fn default_contact_email() -> String {
    "crawler@example.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_database_path() -> String {
    "scraper_results.db".to_string()
}

fn default_results_table() -> String {
    "results".to_string()
}

fn default_max_length() -> usize {
    512
}

fn default_labels() -> Vec<LabelEntry> {
    let label = |name: &str, keywords: &[&str]| LabelEntry {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    };

    vec![
        label(
            "technology",
            &["software", "computer", "programming", "code", "internet", "data", "ai"],
        ),
        label(
            "science",
            &["research", "physics", "biology", "chemistry", "study", "experiment"],
        ),
        label(
            "business",
            &["market", "finance", "company", "economy", "investment", "sales"],
        ),
        label(
            "sports",
            &["game", "team", "match", "league", "player", "score"],
        ),
        label(
            "health",
            &["medical", "medicine", "disease", "fitness", "nutrition", "doctor"],
        ),
        label(
            "politics",
            &["government", "election", "policy", "law", "parliament", "vote"],
        ),
        label(
            "entertainment",
            &["movie", "music", "film", "television", "celebrity", "art"],
        ),
    ]
}
