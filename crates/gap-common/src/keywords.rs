use std::collections::{BTreeSet, HashSet};

use lazy_static::lazy_static;

/// Tokens of this many characters or fewer are discarded.
const MIN_TOKEN_CHARS: usize = 2;

lazy_static! {
    /// Function words that carry no signal about what a venture does.
    pub static ref STOP_WORDS: HashSet<&'static str> = [
        "the", "and", "for", "are", "but", "not", "you", "all", "any", "can",
        "had", "her", "was", "one", "our", "out", "has", "have", "him", "his",
        "how", "its", "may", "new", "now", "old", "see", "two", "way", "who",
        "did", "get", "let", "put", "say", "she", "too", "use", "with", "from",
        "that", "this", "they", "them", "their", "there", "these", "those", "then",
        "than", "what", "when", "where", "which", "while", "will", "would", "could",
        "should", "into", "onto", "over", "under", "about", "after", "before", "also",
        "just", "only", "very", "more", "most", "some", "such", "each", "other",
        "been", "being", "were", "your", "yours", "ours", "both", "through", "because",
        "does", "doing", "here", "same", "own", "off", "again", "further", "once",
    ]
    .into_iter()
    .collect();
}

/// Normalized, de-duplicated significant terms of a text.
///
/// Backed by an ordered set so iteration and serialization are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.0.contains(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of terms in `self` that also appear in `other`.
    pub fn overlap(&self, other: &KeywordSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    /// Terms re-joined with single spaces in sorted order.
    pub fn join(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }
}

impl FromIterator<String> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Lowercase, drop everything that is not a letter, digit or whitespace,
/// split on whitespace, then discard short tokens and stop words.
pub fn extract_keywords(text: &str) -> KeywordSet {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}
