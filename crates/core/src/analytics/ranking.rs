//! Keyword frequency ranking

use crate::types::{KeywordCount, RecordedSearch};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Counts occurrences per keyword
pub fn count_keywords<'a, I>(records: I) -> HashMap<&'a str, u64>
where
    I: IntoIterator<Item = &'a RecordedSearch>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for record in records {
        *counts.entry(record.keyword()).or_insert(0) += 1;
    }
    counts
}

/// Orders by count descending; equal counts fall back to keyword order
pub fn sort_by_count(counts: &mut [KeywordCount]) {
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
}

/// Ranks keywords searched at or after `since`
///
/// Returns at most `top_count` entries, most frequent first.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use hotsearch_core::analytics::ranking::rank_keywords;
/// use hotsearch_core::types::{RecordedSearch, SearchEvent};
///
/// let now = Utc::now();
/// let records: Vec<RecordedSearch> = ["rust", "go", "rust"]
///     .iter()
///     .enumerate()
///     .map(|(i, k)| RecordedSearch {
///         id: i as i64 + 1,
///         event: SearchEvent::new(k, "ip", "pc", now).unwrap(),
///     })
///     .collect();
///
/// let top = rank_keywords(&records, now - Duration::days(7), 1);
/// assert_eq!(top[0].keyword, "rust");
/// assert_eq!(top[0].count, 2);
/// ```
pub fn rank_keywords(
    records: &[RecordedSearch],
    since: DateTime<Utc>,
    top_count: usize,
) -> Vec<KeywordCount> {
    if top_count == 0 {
        return Vec::new();
    }

    let counts = count_keywords(records.iter().filter(|r| r.timestamp() >= since));

    let mut ranked: Vec<KeywordCount> = counts
        .into_iter()
        .map(|(keyword, count)| KeywordCount {
            keyword: keyword.to_string(),
            count,
        })
        .collect();

    sort_by_count(&mut ranked);
    ranked.truncate(top_count);
    ranked
}
