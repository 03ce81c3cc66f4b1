//! Candidate validation and keyword categorization.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::models::{NormalizedItem, RawCandidate};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Source label used when an adapter supplied none.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Tag given to items that match no rule.
pub const FALLBACK_CATEGORY: &str = "other";

/// One row of the categorization table: `category` applies when any keyword occurs.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    /// `haystack` must already be lowercase.
    fn matches(&self, haystack: &str) -> bool {
        self.keywords
            .iter()
            .map(|kw| kw.trim().to_lowercase())
            .any(|kw| !kw.is_empty() && haystack.contains(&kw))
    }
}

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Categories for an item, in rule-table order; `["other"]` if nothing matched.
pub fn categorize(title: &str, source: &str, rules: &[CategoryRule]) -> Vec<String> {
    let haystack = format!("{title} {source}").to_lowercase();
    let cats: Vec<String> = rules
        .iter()
        .filter(|rule| rule.matches(&haystack))
        .map(|rule| rule.category.clone())
        .collect();
    if cats.is_empty() {
        vec![FALLBACK_CATEGORY.to_string()]
    } else {
        cats
    }
}

/// Validate a candidate. Returns `None` (silently) when title or link is empty.
pub fn normalize(candidate: RawCandidate, rules: &[CategoryRule]) -> Option<NormalizedItem> {
    let title = collapse_whitespace(&candidate.title);
    let source = collapse_whitespace(&candidate.source);
    let link = candidate.link.trim().to_string();

    if title.is_empty() || link.is_empty() {
        debug!(title = %title, link = %link, "Dropping incomplete candidate");
        return None;
    }

    let categories = categorize(&title, &source, rules);
    let source = if source.is_empty() {
        UNKNOWN_SOURCE.to_string()
    } else {
        source
    };

    Some(NormalizedItem {
        title,
        source,
        link,
        published: candidate.published,
        categories,
    })
}
