//! Run configuration: sources, limits, ranking and categorization rules.
//!
//! Everything that differs between deployments lives here as data: the ordered
//! source list with per-source extraction rules, the keyword table used for
//! categories, the output limits, and whether a recency window is applied.
//! A built-in document ([`DEFAULT_CONFIG`]) reproduces the production setup.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

use crate::normalize::CategoryRule;
use crate::scrapers::html::ScrapeRules;
use crate::scrapers::search_api::ApiRules;

/// The configuration used when no `--config` file is given.
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.yaml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Upper bound on `items` in the snapshot.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// Recency window in hours; `None` ranks known timestamps first instead.
    #[serde(default)]
    pub lookback_hours: Option<u64>,
    /// Whether snapshot items carry a `categories` field.
    #[serde(default = "default_true")]
    pub include_categories: bool,
    #[serde(default)]
    pub fetch: FetchSettings,
    /// Collected in this order; earlier sources win link collisions.
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub categories: Vec<CategoryRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// How many sources may be in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            concurrency: default_concurrency(),
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One place announcements are collected from.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Written to the `source` field of every item from here.
    pub label: String,
    pub url: String,
    pub strategy: Strategy,
}

/// How a payload is turned into candidates.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// RSS 2.0, RSS 1.0 (RDF) or Atom.
    Feed {
        #[serde(default = "default_feed_limit")]
        limit: usize,
    },
    /// Pattern-based scraping of a listing page.
    Html(ScrapeRules),
    /// JSON search endpoint returning a map of records.
    SearchApi(ApiRules),
}

fn default_max_items() -> usize {
    20
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    25
}

fn default_user_agent() -> String {
    format!("institutional_news/{}", env!("CARGO_PKG_VERSION"))
}

fn default_concurrency() -> usize {
    4
}

fn default_feed_limit() -> usize {
    50
}

impl Config {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// The embedded production configuration.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml_str(DEFAULT_CONFIG)
    }

    /// Load `path` if given, otherwise fall back to [`Config::builtin`].
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.to_path_buf(),
                    source,
                })?;
                Self::from_yaml_str(&raw)?
            }
            None => Self::builtin()?,
        };
        info!(
            sources = config.sources.len(),
            rules = config.categories.len(),
            max_items = config.max_items,
            lookback_hours = ?config.lookback_hours,
            "Loaded configuration"
        );
        Ok(config)
    }
}
