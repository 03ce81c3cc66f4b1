//! One collection run: fetch every source, extract, normalize, merge, snapshot.
//!
//! Sources are fetched concurrently (bounded by `fetch.concurrency`) but their
//! results are consumed in configured order, so the merge sees the same input
//! order on every run regardless of network timing. A failing source is reported
//! and contributes nothing; it never aborts the run.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::{Config, SourceConfig};
use crate::fetcher::{Fetch, FetchError};
use crate::merge::{MergePolicy, merge};
use crate::models::{NormalizedItem, RawCandidate, Snapshot};
use crate::normalize::normalize;
use crate::scrapers::{ExtractError, build_adapter};
use crate::utils::truncate_for_log;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// What one source produced.
#[derive(Debug)]
pub enum SourceOutcome {
    Collected { candidates: Vec<RawCandidate> },
    Failed { reason: SourceError },
}

#[derive(Debug)]
pub struct SourceReport {
    pub label: String,
    pub outcome: SourceOutcome,
}

impl SourceReport {
    /// Why this source produced nothing, if it failed.
    pub fn failure(&self) -> Option<&SourceError> {
        match &self.outcome {
            SourceOutcome::Failed { reason } => Some(reason),
            SourceOutcome::Collected { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub candidates: usize,
    pub normalized: usize,
    pub kept: usize,
}

#[derive(Debug)]
pub struct RunResult {
    pub snapshot: Snapshot,
    pub reports: Vec<SourceReport>,
    pub stats: RunStats,
}

/// Fetch and extract a single source.
///
/// # Errors
///
/// Invalid rules, transport failures and unparseable payloads all end up here.
pub async fn collect_source<F: Fetch>(
    fetcher: &F,
    source: &SourceConfig,
) -> Result<Vec<RawCandidate>, SourceError> {
    let adapter = build_adapter(source)?;
    let payload = fetcher.fetch(&source.url).await?;
    adapter.extract(&payload).map_err(|e| {
        debug!(
            source = %source.label,
            payload_preview = %truncate_for_log(&payload, 300),
            "Payload did not match the source's strategy"
        );
        SourceError::from(e)
    })
}

/// Collect every source, at most `concurrency` at a time, reports in source order.
#[instrument(level = "info", skip_all, fields(sources = sources.len(), concurrency = concurrency))]
pub async fn collect_all<F: Fetch>(
    fetcher: &F,
    sources: &[SourceConfig],
    concurrency: usize,
) -> Vec<SourceReport> {
    stream::iter(sources)
        .map(|source| async move {
            let outcome = match collect_source(fetcher, source).await {
                Ok(candidates) => {
                    info!(source = %source.label, count = candidates.len(), "Collected source");
                    SourceOutcome::Collected { candidates }
                }
                Err(reason) => {
                    warn!(source = %source.label, url = %source.url, error = %reason, "Source failed; contributing nothing");
                    SourceOutcome::Failed { reason }
                }
            };
            SourceReport {
                label: source.label.clone(),
                outcome,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Run the whole pipeline, ranking against `now`.
///
/// The snapshot is stamped with the time it is built, after all fetches finished.
pub async fn run<F: Fetch>(fetcher: &F, config: &Config, now: DateTime<Utc>) -> RunResult {
    let reports = collect_all(fetcher, &config.sources, config.fetch.concurrency).await;

    let mut stats = RunStats::default();
    let mut batches: Vec<Vec<NormalizedItem>> = Vec::with_capacity(reports.len());
    for report in &reports {
        match &report.outcome {
            SourceOutcome::Collected { candidates } => {
                stats.sources_ok += 1;
                stats.candidates += candidates.len();
                let items: Vec<NormalizedItem> = candidates
                    .iter()
                    .cloned()
                    .filter_map(|c| normalize(c, &config.categories))
                    .collect();
                debug!(source = %report.label, kept = items.len(), "Normalized source");
                stats.normalized += items.len();
                batches.push(items);
            }
            SourceOutcome::Failed { .. } => stats.sources_failed += 1,
        }
    }

    let policy = MergePolicy {
        max_items: config.max_items,
        lookback_hours: config.lookback_hours,
    };
    let items = merge(batches, &policy, now);
    stats.kept = items.len();

    let snapshot = Snapshot::new(
        Utc::now(),
        config.lookback_hours,
        &items,
        config.include_categories,
    );
    RunResult {
        snapshot,
        reports,
        stats,
    }
}
