//! Turning heterogeneous timestamp representations into UTC instants.
//!
//! Sources disagree wildly on how they express time:
//!
//! | Origin | Example |
//! |--------|---------|
//! | RSS 2.0 `pubDate` | `Fri, 17 Oct 2025 14:00:00 GMT` |
//! | Atom / RSS 1.0 `dc:date` | `2025-10-17T14:00:00Z` |
//! | Search APIs | `2025-10-17`, `2025-10-17T14:00:00` |
//! | Listing pages | `17 Oct 2025`, `15 January 2026` |
//!
//! Every function here returns `Option<DateTime<Utc>>`: `None` is "unknown" and
//! nothing ever panics or errors on bad input.

use chrono::{DateTime, Month, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// `D Mon YYYY` / `D Month YYYY`, case-insensitive.
static TEXTUAL_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s+([a-z]{3,9})\.?\s+(\d{4})\b").expect("textual date pattern")
});

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Feed entry time: `published` wins over `updated`.
pub fn feed_time(published: Option<&str>, updated: Option<&str>) -> Option<DateTime<Utc>> {
    published
        .and_then(parse_timestamp)
        .or_else(|| updated.and_then(parse_timestamp))
}

/// Parse any timestamp a feed or API is known to emit (RFC 2822 first, then ISO).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| parse_iso(s))
}

/// Parse an ISO-8601 date or datetime.
///
/// A trailing `Z` is rewritten to `+00:00` first. Values without an offset are
/// taken to be UTC, and a bare date is midnight UTC.
pub fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let s = match trimmed.strip_suffix(['Z', 'z']) {
        Some(head) => format!("{head}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Find the first valid `D Mon YYYY` / `D Month YYYY` date inside free text.
///
/// Fragments that look like a date but are not one (`32 Foo 2025`, `31 Feb 2025`)
/// are skipped.
pub fn find_textual_date(text: &str) -> Option<DateTime<Utc>> {
    TEXTUAL_DATE.captures_iter(text).find_map(|caps| {
        let day: u32 = caps[1].parse().ok()?;
        let month: Month = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month.number_from_month(), day)?
            .and_hms_opt(0, 0, 0)
            .map(|ndt| ndt.and_utc())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn rfc2822_with_named_zone() {
        assert_eq!(
            parse_timestamp("Fri, 17 Oct 2025 14:00:00 GMT"),
            Some(utc(2025, 10, 17, 14, 0, 0))
        );
        assert_eq!(
            parse_timestamp("Fri, 17 Oct 2025 10:00:00 -0400"),
            Some(utc(2025, 10, 17, 14, 0, 0))
        );
    }

    #[test]
    fn iso_variants() {
        let want = utc(2025, 10, 17, 14, 0, 0);
        assert_eq!(parse_iso("2025-10-17T14:00:00Z"), Some(want));
        assert_eq!(parse_iso("2025-10-17T14:00:00+00:00"), Some(want));
        assert_eq!(parse_iso("2025-10-17T16:00:00+0200"), Some(want));
        assert_eq!(parse_iso("2025-10-17T14:00:00"), Some(want));
        assert_eq!(parse_iso("2025-10-17T14:00:00.123Z").map(|d| d.timestamp()), Some(want.timestamp()));
        assert_eq!(parse_iso("2025-10-17"), Some(utc(2025, 10, 17, 0, 0, 0)));
    }

    #[test]
    fn garbage_is_unknown() {
        assert_eq!(parse_iso(""), None);
        assert_eq!(parse_iso("yesterday"), None);
        assert_eq!(parse_timestamp("2025-13-45"), None);
    }

    #[test]
    fn feed_time_prefers_published() {
        let got = feed_time(Some("2025-10-17T00:00:00Z"), Some("2025-10-18T00:00:00Z"));
        assert_eq!(got, Some(utc(2025, 10, 17, 0, 0, 0)));

        let fallback = feed_time(Some("not a date"), Some("2025-10-18T00:00:00Z"));
        assert_eq!(fallback, Some(utc(2025, 10, 18, 0, 0, 0)));

        assert_eq!(feed_time(None, None), None);
    }

    #[test]
    fn textual_dates_abbreviated_and_full() {
        assert_eq!(
            find_textual_date("<span>17 Oct 2025</span>"),
            Some(utc(2025, 10, 17, 0, 0, 0))
        );
        assert_eq!(
            find_textual_date("Next release: 5 January 2026, 11:00"),
            Some(utc(2026, 1, 5, 0, 0, 0))
        );
    }

    #[test]
    fn malformed_textual_date_is_unknown() {
        assert_eq!(find_textual_date("32 Foo 2025"), None);
        assert_eq!(find_textual_date("31 Feb 2025"), None);
    }

    #[test]
    fn textual_date_skips_invalid_fragment() {
        assert_eq!(
            find_textual_date("32 Foo 2025 ... 3 Mar 2025"),
            Some(utc(2025, 3, 3, 0, 0, 0))
        );
    }
}
