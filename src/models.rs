//! Data models that flow through the collection pipeline.
//!
//! - [`RawCandidate`]: what a source adapter extracts, before any validation
//! - [`NormalizedItem`]: a validated, categorized record keyed by its link
//! - [`Snapshot`] / [`SnapshotItem`]: the JSON document written at the end of a run
//!
//! Field names of the snapshot types are part of the output contract consumed by
//! the dashboard, so they are snake_case and must not be renamed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::iso_utc;

/// An unvalidated record as extracted by a source adapter.
///
/// Adapters degrade to placeholder values instead of dropping a candidate, so any
/// field may still be empty here. The normalizer performs the only hard rejection.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    /// Headline as found in the payload, whitespace not yet collapsed.
    pub title: String,
    /// Label of the source this candidate came from (e.g. "Federal Reserve").
    pub source: String,
    /// Absolute link to the announcement.
    pub link: String,
    /// Publication instant, if the adapter could determine one.
    pub published: Option<DateTime<Utc>>,
}

impl RawCandidate {
    pub fn new(
        title: impl Into<String>,
        source: impl Into<String>,
        link: impl Into<String>,
        published: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            link: link.into(),
            published,
        }
    }
}

/// A validated announcement. Two items with the same `link` are the same item.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItem {
    pub title: String,
    pub source: String,
    pub link: String,
    /// `None` means "timestamp unknown", never "epoch".
    pub published: Option<DateTime<Utc>>,
    /// Never empty; `["other"]` when no keyword rule matched.
    pub categories: Vec<String>,
}

impl NormalizedItem {
    /// Project this item into its output shape.
    pub fn to_snapshot_item(&self, include_categories: bool) -> SnapshotItem {
        SnapshotItem {
            title: self.title.clone(),
            source: self.source.clone(),
            link: self.link.clone(),
            published_utc: self.published.as_ref().map(iso_utc),
            categories: include_categories.then(|| self.categories.clone()),
        }
    }
}

/// The document written to disk at the end of every run.
#[derive(Debug, Deserialize, Serialize)]
pub struct Snapshot {
    /// Creation instant, ISO-8601 UTC with second precision.
    pub generated_at_utc: String,
    /// Only present when the recency window was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookback_hours: Option<u64>,
    pub items: Vec<SnapshotItem>,
}

impl Snapshot {
    pub fn new(
        generated_at: DateTime<Utc>,
        lookback_hours: Option<u64>,
        items: &[NormalizedItem],
        include_categories: bool,
    ) -> Self {
        Self {
            generated_at_utc: iso_utc(&generated_at),
            lookback_hours,
            items: items
                .iter()
                .map(|item| item.to_snapshot_item(include_categories))
                .collect(),
        }
    }
}

/// One entry of [`Snapshot::items`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SnapshotItem {
    pub title: String,
    pub source: String,
    pub link: String,
    /// Serialized as `null` when unknown; the key is always present.
    pub published_utc: Option<String>,
    /// Omitted entirely when categories are disabled in the configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}
