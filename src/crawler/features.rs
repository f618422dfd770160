//! Page features and the normalized text handed to the classifier

use std::collections::HashSet;

/// Features extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFeatures {
    pub title: String,
    /// Absolute links with a non-empty host, in document order
    pub links: Vec<String>,
    pub meta_description: String,
    pub meta_keywords: String,
    pub body_text: String,
}

impl PageFeatures {
    /// Builds the classifier input: title, body, description and keywords
    /// joined, lower-cased, de-duplicated and stripped of punctuation
    pub fn feature_string(&self) -> String {
        let combined = [
            self.title.as_str(),
            self.body_text.as_str(),
            self.meta_description.as_str(),
            self.meta_keywords.as_str(),
        ]
        .join(" ");

        normalize_text(&combined.to_lowercase())
    }
}

/// Removes repeated words and special characters
///
/// Stripping can make two distinct words identical ("rust," and "rust"), so
/// duplicates are removed again afterwards. The result is a fixed point:
/// normalizing it again returns it unchanged.
pub fn normalize_text(text: &str) -> String {
    remove_duplicate_words(&remove_special_characters(&remove_duplicate_words(text)))
}

/// Keeps the first occurrence of each whitespace-separated word
pub fn remove_duplicate_words(text: &str) -> String {
    let mut seen = HashSet::new();
    text.split_whitespace()
        .filter(|word| seen.insert(*word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops every character that is neither alphanumeric nor whitespace
pub fn remove_special_characters(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}
