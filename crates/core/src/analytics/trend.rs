//! Hour-of-day search volume trend

use crate::types::{RecordedSearch, TrendBucket};
use chrono::{DateTime, Timelike, Utc};

/// Buckets searches from the last `hours` hours by their UTC hour of day
///
/// The result always holds exactly `hours` buckets with offsets
/// `0..hours`. Buckets are keyed by the wall-clock hour of each event, not
/// by hours elapsed since `now`: with `hours > 24` the offsets from 24 up
/// stay empty, and an event whose hour of day is not below `hours` has no
/// bucket and is skipped.
///
/// `window_start` is `now - hours`, clamped by the caller.
pub fn hourly_trend(
    records: &[RecordedSearch],
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
    hours: u32,
) -> Vec<TrendBucket> {
    let mut counts = vec![0u64; hours as usize];
    if counts.is_empty() {
        return Vec::new();
    }

    for record in records {
        let at = record.timestamp();
        if at < window_start || at > now {
            continue;
        }
        if let Some(slot) = counts.get_mut(at.hour() as usize) {
            *slot += 1;
        }
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(offset, count)| TrendBucket {
            hour_offset: offset as u32,
            count,
        })
        .collect()
}
