//! HTTP fetcher implementation
//!
//! This module handles page retrieval for the crawler:
//! - Building HTTP clients with a descriptive user agent string
//! - GET requests to fetch page content
//! - Classifying transport failures
//!
//! Redirects, TLS and timeouts are left to reqwest; the crawl core only sees
//! a body or an error.

use crate::config::UserAgentConfig;
use crate::CrawlError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Retrieves raw page content for a URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, CrawlError>;
}

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use topic_crawler::config::UserAgentConfig;
/// use topic_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.request_timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &UserAgentConfig) -> Result<Self, CrawlError> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a URL and returns its body
    ///
    /// Connection failures, timeouts, malformed URLs and unreadable bodies
    /// are errors. A non-success status is not: the body of an error page is
    /// still returned for extraction.
    async fn fetch(&self, url: &str) -> Result<String, CrawlError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| CrawlError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned HTTP {}", url, status.as_u16());
        }

        response.text().await.map_err(|source| CrawlError::Http {
            url: url.to_string(),
            source,
        })
    }
}
