//! Search query handed to an engine.

use std::path::PathBuf;

use url::Url;

/// A search query: the text typed by the user plus the location to search in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    location: Url,
}

impl Query {
    pub fn new(text: impl Into<String>, location: Url) -> Self {
        Self {
            text: text.into(),
            location,
        }
    }

    /// Builds a query from individual terms, joined by a single space.
    pub fn from_terms(terms: &[String], location: Url) -> Self {
        Self::new(terms.join(" "), location)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Local filesystem path of the location, if it is a `file://` URI.
    pub fn location_path(&self) -> Option<PathBuf> {
        if self.location.scheme() != "file" {
            return None;
        }
        self.location.to_file_path().ok()
    }

    /// Lowercased, whitespace-separated words of the query text.
    pub fn words(&self) -> Vec<String> {
        self.text
            .split_whitespace()
            .map(|word| word.to_lowercase())
            .collect()
    }
}
