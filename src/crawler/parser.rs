//! HTML feature extraction
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (absolute `<a href>` targets only)
//! - Page title
//! - Meta description and keywords
//! - Visible body text

use crate::crawler::features::PageFeatures;
use crate::CrawlError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Turns raw page content into [`PageFeatures`]
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, raw: &str) -> Result<PageFeatures, CrawlError>;
}

/// [`FeatureExtractor`] backed by the `scraper` HTML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureExtractor for HtmlExtractor {
    fn extract(&self, raw: &str) -> Result<PageFeatures, CrawlError> {
        parse_html(raw)
    }
}

/// Parses HTML content and extracts the page features
///
/// # Link Extraction Rules
///
/// Only `<a href="...">` values that parse as absolute URLs with a non-empty
/// host are kept, verbatim. Relative paths, fragment-only anchors and
/// host-less schemes (`mailto:`, `javascript:`, `data:`) are dropped.
///
/// # Example
///
/// ```
/// use topic_crawler::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="https://example.com/page">Link</a></body></html>"#;
/// let features = parse_html(html).unwrap();
/// assert_eq!(features.title, "Test");
/// assert_eq!(features.links, vec!["https://example.com/page"]);
/// ```
pub fn parse_html(html: &str) -> Result<PageFeatures, CrawlError> {
    let document = Html::parse_document(html);

    let title = extract_title(&document)?;
    let links = extract_links(&document)?;
    let (meta_description, meta_keywords) = extract_metadata(&document)?;
    let body_text = extract_text(&document)?;

    Ok(PageFeatures {
        title,
        links,
        meta_description,
        meta_keywords,
        body_text,
    })
}

fn selector(css: &str) -> Result<Selector, CrawlError> {
    Selector::parse(css)
        .map_err(|e| CrawlError::Extraction(format!("invalid selector {:?}: {:?}", css, e)))
}

/// Extracts the page title, or an empty string if there is none
fn extract_title(document: &Html) -> Result<String, CrawlError> {
    let title_selector = selector("title")?;

    Ok(document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default())
}

/// Extracts all absolute links from the document
fn extract_links(document: &Html) -> Result<Vec<String>, CrawlError> {
    let a_selector = selector("a[href]")?;

    Ok(document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_valid_link(href))
        .map(str::to_string)
        .collect())
}

/// A link is valid if it is an absolute URL with a non-empty host
pub fn is_valid_link(link: &str) -> bool {
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(|host| !host.is_empty()))
        .unwrap_or(false)
}

/// Extracts the meta description and keywords
///
/// When a tag appears more than once the last occurrence wins.
fn extract_metadata(document: &Html) -> Result<(String, String), CrawlError> {
    let meta_selector = selector("meta[name]")?;

    let mut description = String::new();
    let mut keywords = String::new();
    for element in document.select(&meta_selector) {
        let name = element.value().attr("name").unwrap_or_default();
        let content = element.value().attr("content").unwrap_or_default();
        if name.eq_ignore_ascii_case("description") {
            description = content.to_string();
        } else if name.eq_ignore_ascii_case("keywords") {
            keywords = content.to_string();
        }
    }

    Ok((description, keywords))
}

/// Extracts the body text with whitespace runs collapsed to single spaces
fn extract_text(document: &Html) -> Result<String, CrawlError> {
    let body_selector = selector("body")?;

    let root = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    Ok(collapse_whitespace(root))
}

fn collapse_whitespace(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
