//! Rising hotspot detection
//!
//! A hotspot is a keyword searched in both of the last two hours whose count
//! in the most recent hour grew by more than a threshold percentage over the
//! hour before. Brand-new keywords never qualify: growth needs a baseline.

use super::saturating_sub;
use crate::types::{Hotspot, RecordedSearch};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Length of each comparison window
pub fn window_length() -> Duration {
    Duration::hours(1)
}

/// Whether `recent` over `previous` exceeds `threshold_percent` growth
///
/// Growth is truncated to whole percent before comparing, so 3 over 2
/// (exactly 50%) does not exceed a threshold of 50.
pub fn exceeds_threshold(recent: u64, previous: u64, threshold_percent: i64) -> bool {
    if previous == 0 {
        return false;
    }
    let recent = recent as i64;
    let previous = previous as i64;
    (recent - previous) * 100 / previous > threshold_percent
}

/// Growth of `recent` over `previous` in percent, `None` without a baseline
pub fn growth_rate_percent(recent: u64, previous: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((recent as f64 - previous as f64) * 100.0 / previous as f64)
}

/// Finds rising keywords as of `now`
///
/// Recent window is `(now - 1h, now]`, previous window is
/// `(now - 2h, now - 1h]`. Results are sorted by growth descending, then by
/// recent count descending, then by keyword, and capped at `max_results`.
pub fn detect_hotspots(
    records: &[RecordedSearch],
    now: DateTime<Utc>,
    threshold_percent: i64,
    max_results: usize,
) -> Vec<Hotspot> {
    let recent_start = saturating_sub(now, window_length());
    let previous_start = saturating_sub(recent_start, window_length());

    let mut recent_counts: HashMap<&str, u64> = HashMap::new();
    let mut previous_counts: HashMap<&str, u64> = HashMap::new();

    for record in records {
        let at = record.timestamp();
        if at > now {
            continue;
        }
        if at > recent_start {
            *recent_counts.entry(record.keyword()).or_insert(0) += 1;
        } else if at > previous_start {
            *previous_counts.entry(record.keyword()).or_insert(0) += 1;
        }
    }

    let mut hotspots: Vec<Hotspot> = recent_counts
        .into_iter()
        .filter_map(|(keyword, recent)| {
            let previous = previous_counts.get(keyword).copied().unwrap_or(0);
            if !exceeds_threshold(recent, previous, threshold_percent) {
                return None;
            }
            let growth = growth_rate_percent(recent, previous)?;
            Some(Hotspot {
                keyword: keyword.to_string(),
                recent_count: recent,
                previous_count: previous,
                growth_rate_percent: growth,
            })
        })
        .collect();

    hotspots.sort_by(|a, b| {
        b.growth_rate_percent
            .total_cmp(&a.growth_rate_percent)
            .then_with(|| b.recent_count.cmp(&a.recent_count))
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    hotspots.truncate(max_results);
    hotspots
}
