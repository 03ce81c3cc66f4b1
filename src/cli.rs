//! Command-line interface definitions for Institutional News.
//!
//! All arguments can be provided via command-line flags, and the output and
//! config paths also via environment variables. Flags override the values from
//! the configuration document.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Command-line arguments for the Institutional News collector.
///
/// # Examples
///
/// ```sh
/// # Built-in sources, default output path
/// institutional_news
///
/// # Custom sources, all items regardless of age
/// institutional_news -c ./sources.yaml -o ./latest.json --no-lookback
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the JSON snapshot to write
    #[arg(short, long, env = "NEWS_OUTPUT", default_value = "docs/data/latest_news.json")]
    pub output: PathBuf,

    /// Optional path to a YAML config (the built-in source list is used otherwise)
    #[arg(short, long, env = "NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum number of items in the snapshot
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Recency window in hours
    #[arg(long, conflicts_with = "no_lookback")]
    pub lookback_hours: Option<u64>,

    /// Disable the recency window
    #[arg(long)]
    pub no_lookback: bool,

    /// Omit `categories` from snapshot items
    #[arg(long)]
    pub no_categories: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// How many sources to fetch at once
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl Cli {
    /// Apply flag overrides on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(n) = self.max_items {
            config.max_items = n;
        }
        if self.no_lookback {
            config.lookback_hours = None;
        } else if let Some(h) = self.lookback_hours {
            config.lookback_hours = Some(h);
        }
        if self.no_categories {
            config.include_categories = false;
        }
        if let Some(t) = self.timeout_secs {
            config.fetch.timeout_secs = t;
        }
        if let Some(c) = self.concurrency {
            config.fetch.concurrency = c;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "institutional_news",
            "--output",
            "./out/news.json",
            "--config",
            "./sources.yaml",
        ]);

        assert_eq!(cli.output, PathBuf::from("./out/news.json"));
        assert_eq!(cli.config, Some(PathBuf::from("./sources.yaml")));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["institutional_news", "-o", "/tmp/news.json", "-c", "/tmp/c.yaml"]);

        assert_eq!(cli.output, PathBuf::from("/tmp/news.json"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let mut config = Config::builtin().unwrap();
        let cli = Cli::parse_from([
            "institutional_news",
            "--max-items",
            "5",
            "--no-lookback",
            "--no-categories",
            "--timeout-secs",
            "3",
            "--concurrency",
            "1",
        ]);
        cli.apply_to(&mut config);

        assert_eq!(config.max_items, 5);
        assert_eq!(config.lookback_hours, None);
        assert!(!config.include_categories);
        assert_eq!(config.fetch.timeout_secs, 3);
        assert_eq!(config.fetch.concurrency, 1);
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let mut config = Config::builtin().unwrap();
        Cli::parse_from(["institutional_news", "-o", "x.json"]).apply_to(&mut config);
        assert_eq!(config.max_items, 20);
        assert_eq!(config.lookback_hours, Some(24));
        assert!(config.include_categories);
    }

    #[test]
    fn test_lookback_conflicts_with_no_lookback() {
        let result = Cli::try_parse_from([
            "institutional_news",
            "--lookback-hours",
            "12",
            "--no-lookback",
        ]);
        assert!(result.is_err());
    }
}
