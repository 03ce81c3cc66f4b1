//! Source adapters: turning fetched payloads into [`RawCandidate`]s.
//!
//! Each configured source names a [`Strategy`]; [`build_adapter`] turns it into
//! something implementing [`Extract`]. Adapters never fetch, they only parse, so
//! they can be exercised with fixture strings.
//!
//! # Supported Strategies
//!
//! | Strategy | Module | Payload | Notes |
//! |----------|--------|---------|-------|
//! | `feed` | [`feed`] | RSS 2.0 / RSS 1.0 / Atom | first `limit` entries |
//! | `html` | [`html`] | listing page | regex link + window heuristics |
//! | `search_api` | [`search_api`] | JSON map of records | alternate key lists |
//!
//! # Failure Model
//!
//! Whole-payload problems (malformed XML, unexpected JSON shape, a bad pattern in
//! the configuration) are returned as [`ExtractError`] and the source contributes
//! nothing. Per-item problems degrade to placeholder values instead.

pub mod feed;
pub mod html;
pub mod search_api;

use thiserror::Error;

use crate::config::{SourceConfig, Strategy};
use crate::models::RawCandidate;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed feed: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected payload shape: {0}")]
    Shape(String),

    #[error("invalid pattern in source rules: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// A source-specific extraction strategy.
pub trait Extract {
    fn extract(&self, payload: &str) -> Result<Vec<RawCandidate>, ExtractError>;
}

/// Build the adapter for a configured source.
///
/// # Errors
///
/// Fails when the source's rules do not compile (bad regex, bad base URL).
pub fn build_adapter(source: &SourceConfig) -> Result<Box<dyn Extract>, ExtractError> {
    let label = source.label.as_str();
    let adapter: Box<dyn Extract> = match &source.strategy {
        Strategy::Feed { limit } => Box::new(feed::FeedAdapter::new(label, *limit)),
        Strategy::Html(rules) => Box::new(html::HtmlAdapter::new(label, rules)?),
        Strategy::SearchApi(rules) => Box::new(search_api::SearchApiAdapter::new(label, rules)),
    };
    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_every_builtin_source_builds() {
        let config = Config::builtin().unwrap();
        for source in &config.sources {
            assert!(build_adapter(source).is_ok(), "{} failed to build", source.label);
        }
    }

    #[test]
    fn test_bad_pattern_is_an_extract_error() {
        let yaml = r#"
sources:
  - label: Broken
    url: "https://example.org"
    strategy:
      kind: html
      link_pattern: 'href="(['
      fallback_title: "x"
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert!(matches!(
            build_adapter(&config.sources[0]),
            Err(ExtractError::Pattern(_))
        ));
    }
}
