//! # Institutional News
//!
//! Collects announcements from central banks and international financial
//! institutions, normalizes them into one record shape, and writes a bounded,
//! ranked JSON snapshot for a dashboard.
//!
//! ## Features
//!
//! - Structured feeds (Federal Reserve, BIS, Bank of England) via RSS/RDF/Atom
//! - Listing pages without feeds (IMF, OECD) via pattern rules
//! - JSON search endpoints (World Bank) via alternate key lists
//! - Keyword categorization, link dedup, recency ranking
//! - Sources, limits and rules configurable in YAML
//!
//! ## Usage
//!
//! ```sh
//! institutional_news -o docs/data/latest_news.json
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Fetching**: Download every configured source (bounded concurrency)
//! 2. **Extraction**: Turn each payload into candidates with the source's strategy
//! 3. **Normalization**: Clean, validate and categorize candidates
//! 4. **Merge**: Dedup by link, rank by recency, truncate
//! 5. **Output**: Replace the JSON snapshot
//!
//! A failing source never fails the run; only writing the snapshot can.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod fetcher;
mod merge;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod scrapers;
mod timeparse;
mod utils;

use cli::Cli;
use config::Config;
use fetcher::HttpFetcher;
use outputs::json;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("institutional_news starting up");

    let args = Cli::parse();
    debug!(?args.output, ?args.config, "Parsed CLI arguments");

    let mut config = Config::load(args.config.as_deref())?;
    args.apply_to(&mut config);

    let fetcher = HttpFetcher::new(&config.fetch.user_agent, config.fetch.timeout())?;

    let result = pipeline::run(&fetcher, &config, Utc::now()).await;

    let failed: Vec<String> = result
        .reports
        .iter()
        .filter_map(|r| r.failure().map(|reason| format!("{}: {reason}", r.label)))
        .collect();
    let stats = result.stats;
    if !failed.is_empty() {
        warn!(?failed, "Some sources contributed no items this run");
    }
    info!(
        sources_ok = stats.sources_ok,
        sources_failed = stats.sources_failed,
        candidates = stats.candidates,
        normalized = stats.normalized,
        kept = stats.kept,
        "Collection complete"
    );

    if let Err(e) = json::write_snapshot(&result.snapshot, &args.output).await {
        error!(path = %args.output.display(), error = %e, "Failed to write snapshot");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
