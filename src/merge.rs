//! Combining per-source item lists into one ranked, bounded list.
//!
//! Steps, in order:
//!
//! 1. **Dedup** by link across all sources; the first occurrence wins and
//!    first-seen order is kept.
//! 2. **Rank**, depending on whether a recency window is configured:
//!    - with a window: items timestamped inside `[now - lookback, now]` come
//!      first, newest first; everything else (unknown time, too old, or in the
//!      future) follows in first-seen order. Nothing is dropped.
//!    - without: items with a usable timestamp first, newest first; the rest
//!      after, in first-seen order.
//! 3. **Truncate** to `max_items`.
//!
//! All sorts are stable, so equal timestamps keep their first-seen order.
//!
//! A timestamp more than [`FUTURE_TOLERANCE`] past `now` (typically a scheduled
//! release date) is kept on the item but ranked as if it were unknown.

use chrono::{DateTime, TimeDelta, Utc};
use itertools::Itertools;
use std::cmp::Reverse;

use crate::models::NormalizedItem;

/// Clock skew allowed between a source and this host before a timestamp counts as future.
pub const FUTURE_TOLERANCE: TimeDelta = TimeDelta::minutes(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    pub max_items: usize,
    pub lookback_hours: Option<u64>,
}

/// Result of splitting deduplicated items around the recency cutoff.
#[derive(Debug, Default)]
pub struct Partition {
    /// Timestamped inside the window, newest first.
    pub recent: Vec<NormalizedItem>,
    /// Everything else, in first-seen order.
    pub held_back: Vec<NormalizedItem>,
}

/// Timestamp usable for ranking: known and not in the future.
fn rank_time(item: &NormalizedItem, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    item.published.filter(|t| *t <= now + FUTURE_TOLERANCE)
}

/// Start of the recency window; saturates instead of overflowing.
pub fn cutoff(now: DateTime<Utc>, lookback_hours: u64) -> DateTime<Utc> {
    i64::try_from(lookback_hours)
        .ok()
        .and_then(TimeDelta::try_hours)
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Keep the first item for every distinct link.
pub fn dedup_by_link<I>(items: I) -> Vec<NormalizedItem>
where
    I: IntoIterator<Item = NormalizedItem>,
{
    items
        .into_iter()
        .unique_by(|item| item.link.clone())
        .collect()
}

/// Split into recent and held-back. `recent.len() + held_back.len() == items.len()`.
pub fn partition_by_recency(
    items: Vec<NormalizedItem>,
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Partition {
    let (mut recent, held_back): (Vec<_>, Vec<_>) = items
        .into_iter()
        .partition(|item| rank_time(item, now).is_some_and(|t| t >= cutoff));
    recent.sort_by(|a, b| b.published.cmp(&a.published));
    Partition { recent, held_back }
}

/// Known timestamps first (newest first), unknown ones after in original order.
fn rank_known_first(mut items: Vec<NormalizedItem>, now: DateTime<Utc>) -> Vec<NormalizedItem> {
    items.sort_by_key(|item| Reverse(rank_time(item, now)));
    items
}

/// Dedup, rank and truncate the per-source lists, which must be in source order.
pub fn merge(
    batches: Vec<Vec<NormalizedItem>>,
    policy: &MergePolicy,
    now: DateTime<Utc>,
) -> Vec<NormalizedItem> {
    let deduped = dedup_by_link(batches.into_iter().flatten());

    let mut ranked = match policy.lookback_hours {
        Some(hours) => {
            let Partition {
                mut recent,
                held_back,
            } = partition_by_recency(deduped, cutoff(now, hours), now);
            recent.extend(held_back);
            recent
        }
        None => rank_known_first(deduped, now),
    };

    ranked.truncate(policy.max_items);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 17, 12, 0, 0).unwrap()
    }

    fn item(title: &str, link: &str, hours_ago: Option<i64>) -> NormalizedItem {
        NormalizedItem {
            title: title.to_string(),
            source: "Test".to_string(),
            link: link.to_string(),
            published: hours_ago.map(|h| now() - TimeDelta::hours(h)),
            categories: vec!["other".to_string()],
        }
    }

    fn links(items: &[NormalizedItem]) -> Vec<&str> {
        items.iter().map(|i| i.link.as_str()).collect()
    }

    #[test]
    fn scenario_dedup_recent_then_held_back() {
        let batches = vec![vec![
            item("Fed raises rates", "A", Some(1)),
            item("Fed raises rates", "A", Some(2)),
            item("ECB holds rates", "B", None),
        ]];
        let policy = MergePolicy {
            max_items: 5,
            lookback_hours: Some(24),
        };
        let got = merge(batches, &policy, now());

        assert_eq!(links(&got), vec!["A", "B"]);
        assert_eq!(got[0].published, Some(now() - TimeDelta::hours(1)));
        assert_eq!(got[1].published, None);
    }

    #[test]
    fn dedup_keeps_first_occurrence_across_sources() {
        let batches = vec![
            vec![item("first title", "X", Some(5))],
            vec![item("second title", "X", Some(1)), item("other", "Y", Some(3))],
        ];
        let got = dedup_by_link(batches.into_iter().flatten());
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].title, "first title");
        assert_eq!(got[1].link, "Y");
    }

    #[test]
    fn partition_is_complete_and_drops_nothing() {
        let items = vec![
            item("new", "a", Some(1)),
            item("old", "b", Some(48)),
            item("unknown", "c", None),
            item("newer", "d", Some(0)),
            item("scheduled", "e", Some(-72)),
        ];
        let total = items.len();
        let p = partition_by_recency(items, cutoff(now(), 24), now());

        assert_eq!(p.recent.len() + p.held_back.len(), total);
        assert_eq!(links(&p.recent), vec!["d", "a"]);
        assert_eq!(links(&p.held_back), vec!["b", "c", "e"]);
    }

    #[test]
    fn recent_ties_keep_original_order() {
        let items = vec![
            item("one", "1", Some(2)),
            item("two", "2", Some(2)),
            item("three", "3", Some(2)),
        ];
        let p = partition_by_recency(items, cutoff(now(), 24), now());
        assert_eq!(links(&p.recent), vec!["1", "2", "3"]);
    }

    #[test]
    fn without_lookback_known_first_then_unknown_in_order() {
        let batches = vec![vec![
            item("u1", "u1", None),
            item("old", "old", Some(100)),
            item("u2", "u2", None),
            item("new", "new", Some(1)),
            item("future", "future", Some(-24)),
        ]];
        let policy = MergePolicy {
            max_items: 10,
            lookback_hours: None,
        };
        let got = merge(batches, &policy, now());
        assert_eq!(links(&got), vec!["new", "old", "u1", "u2", "future"]);
    }

    #[test]
    fn output_is_bounded_by_max_items() {
        let batch: Vec<NormalizedItem> = (0..50)
            .map(|i| item("t", &format!("link-{i}"), Some(i)))
            .collect();
        for (max_items, lookback_hours) in [(0, Some(24)), (5, Some(24)), (20, None), (100, None)] {
            let policy = MergePolicy {
                max_items,
                lookback_hours,
            };
            let got = merge(vec![batch.clone()], &policy, now());
            assert_eq!(got.len(), max_items.min(50));
        }
    }

    #[test]
    fn truncation_keeps_newest() {
        let batch = vec![
            item("c", "c", Some(3)),
            item("a", "a", Some(1)),
            item("b", "b", Some(2)),
        ];
        let policy = MergePolicy {
            max_items: 2,
            lookback_hours: Some(24),
        };
        assert_eq!(links(&merge(vec![batch], &policy, now())), vec!["a", "b"]);
    }

    #[test]
    fn cutoff_saturates_on_huge_lookback() {
        assert_eq!(cutoff(now(), u64::MAX), DateTime::<Utc>::MIN_UTC);
        assert_eq!(cutoff(now(), 24), now() - TimeDelta::hours(24));
    }

    #[test]
    fn item_exactly_at_cutoff_is_recent() {
        let p = partition_by_recency(vec![item("edge", "e", Some(24))], cutoff(now(), 24), now());
        assert_eq!(p.recent.len(), 1);
    }
}
