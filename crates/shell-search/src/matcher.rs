//! Term matching for quick matches against bookmark and mount names.

use unicode_normalization::UnicodeNormalization;

/// Canonical decomposition followed by lowercasing.
pub fn prepare_for_compare(text: &str) -> String {
    text.nfd().collect::<String>().to_lowercase()
}

/// Returns true for a lone term that is exactly one character once composed.
/// Such queries are too broad to be worth searching.
pub fn is_single_character_query(terms: &[String]) -> bool {
    match terms {
        [term] => term.nfc().count() == 1,
        _ => false,
    }
}

/// Normalized query terms. A candidate matches when it contains every term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTerms {
    terms: Vec<String>,
}

impl QueryTerms {
    /// Normalizes `text` and splits it on spaces.
    pub fn from_text(text: &str) -> Self {
        let terms = prepare_for_compare(text)
            .split(' ')
            .filter(|term| !term.is_empty())
            .map(str::to_string)
            .collect();
        Self { terms }
    }

    pub fn from_terms(terms: &[String]) -> Self {
        Self::from_text(&terms.join(" "))
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, candidate: &str) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let candidate = prepare_for_compare(candidate);
        self.terms
            .iter()
            .all(|term| candidate.contains(term.as_str()))
    }
}
