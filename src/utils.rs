//! Utility functions for timestamp formatting, string slicing, and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - ISO-8601 formatting of UTC instants for the snapshot
//! - Char-boundary-safe windows into large HTML payloads
//! - String truncation for logging
//! - Parent directory creation for the output file

use chrono::{DateTime, SecondsFormat, Utc};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Format an instant as ISO-8601 UTC with second precision.
///
/// The offset is written as `+00:00` rather than `Z`, matching what downstream
/// consumers of the snapshot have always received.
///
/// # Examples
///
/// ```ignore
/// let ts = Utc.with_ymd_and_hms(2025, 10, 17, 9, 30, 0).unwrap();
/// assert_eq!(iso_utc(&ts), "2025-10-17T09:30:00+00:00");
/// ```
pub fn iso_utc(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Largest char boundary in `s` that is `<= idx`.
fn floor_boundary(s: &str, idx: usize) -> usize {
    let mut i = idx.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Slice `s` from `start` for at most `len` bytes, snapped to char boundaries.
pub fn bounded_slice(s: &str, start: usize, len: usize) -> &str {
    let from = floor_boundary(s, start);
    let to = floor_boundary(s, start.saturating_add(len));
    &s[from..to]
}

/// Text window of `before` bytes ahead of `idx` and `after` bytes from it.
///
/// Used by the HTML scrapers to look for a title and a date near a link.
pub fn window_around(s: &str, idx: usize, before: usize, after: usize) -> &str {
    let from = floor_boundary(s, idx.saturating_sub(before));
    let to = floor_boundary(s, idx.saturating_add(after));
    &s[from..to]
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to roughly `max` bytes with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let cut = floor_boundary(s, max);
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

/// Ensure the directory that will hold `path` exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created (permission denied,
/// read-only filesystem, a file in the way, etc.).
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            debug!(dir = %parent.display(), "Output directory ready");
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_utc_second_precision() {
        let ts = Utc.with_ymd_and_hms(2025, 10, 17, 9, 30, 5).unwrap()
            + chrono::Duration::milliseconds(750);
        assert_eq!(iso_utc(&ts), "2025-10-17T09:30:05+00:00");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_window_around_clamps_to_bounds() {
        let s = "0123456789";
        assert_eq!(window_around(s, 5, 2, 2), "3456");
        assert_eq!(window_around(s, 1, 5, 100), "0123456789");
    }

    #[test]
    fn test_window_around_respects_char_boundaries() {
        // 'é' is two bytes; a cut inside it must snap backwards.
        let s = "ééééé";
        let w = window_around(s, 5, 2, 2);
        assert!(w.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_bounded_slice() {
        assert_eq!(bounded_slice("abcdef", 2, 3), "cde");
        assert_eq!(bounded_slice("abcdef", 4, 100), "ef");
        assert_eq!(bounded_slice("abcdef", 10, 3), "");
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("docs/data/latest_news.json");
        ensure_parent_dir(&target).await.unwrap();
        assert!(tmp.path().join("docs/data").is_dir());
    }
}
