//! Analytics engine
//!
//! Ties an [`EventSource`] to the ranking, trend and hotspot algorithms. The
//! engine holds no state besides its configuration: every query fetches a
//! fresh slice of events and aggregates it from scratch.

use super::{hotspot, ranking, saturating_sub, trend};
use crate::config::AnalyticsConfig;
use crate::store::EventSource;
use crate::types::{Hotspot, KeywordCount, RecordedSearch, SearchEvent, TrendBucket};
use crate::{HotsearchError, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Search analytics over an event source
#[derive(Clone)]
pub struct AnalyticsEngine {
    source: Arc<dyn EventSource>,
    config: AnalyticsConfig,
}

impl std::fmt::Debug for AnalyticsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnalyticsEngine {
    /// Creates a new engine
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use hotsearch_core::analytics::AnalyticsEngine;
    /// use hotsearch_core::config::AnalyticsConfig;
    /// use hotsearch_core::store::MemoryEventStore;
    ///
    /// let engine = AnalyticsEngine::new(
    ///     Arc::new(MemoryEventStore::new()),
    ///     AnalyticsConfig::default(),
    /// );
    /// assert_eq!(engine.config().top_count, 10);
    /// ```
    pub fn new(source: Arc<dyn EventSource>, config: AnalyticsConfig) -> Self {
        Self { source, config }
    }

    /// Engine configuration
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Records one search stamped with the current time
    ///
    /// # Errors
    ///
    /// Returns `HotsearchError::Validation` for a blank or oversized keyword,
    /// or whatever the event source reports on append.
    pub async fn record_search(
        &self,
        keyword: &str,
        ip: &str,
        source: &str,
    ) -> Result<RecordedSearch> {
        self.record_search_at(keyword, ip, source, Utc::now()).await
    }

    /// Records one search with an explicit timestamp
    pub async fn record_search_at(
        &self,
        keyword: &str,
        ip: &str,
        source: &str,
        at: DateTime<Utc>,
    ) -> Result<RecordedSearch> {
        let event = SearchEvent::new(keyword, ip, source, at)?;
        let record = self.source.append(event).await?;

        info!(
            keyword = %record.event.keyword,
            ip = %record.event.ip,
            source = %record.event.source,
            "Recorded search {}",
            record.id
        );
        Ok(record)
    }

    /// Most searched keywords over the configured lookback
    pub async fn top_keywords(&self) -> Result<Vec<String>> {
        self.top_keywords_at(Utc::now()).await
    }

    /// Most searched keywords over the lookback ending at `now`
    pub async fn top_keywords_at(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        Ok(self
            .top_keywords_with_count_at(now)
            .await?
            .into_iter()
            .map(|entry| entry.keyword)
            .collect())
    }

    /// Most searched keywords with their counts over the configured lookback
    pub async fn top_keywords_with_count(&self) -> Result<Vec<KeywordCount>> {
        self.top_keywords_with_count_at(Utc::now()).await
    }

    /// Most searched keywords with counts over the lookback ending at `now`
    ///
    /// The window is `[now - days, ...)`; an event exactly `days` old is
    /// included.
    pub async fn top_keywords_with_count_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<KeywordCount>> {
        let since = saturating_sub(now, Duration::days(i64::from(self.config.days)));
        let events = self.events_since(since).await?;

        let ranked = ranking::rank_keywords(&events, since, self.config.top_count);
        debug!(
            "Ranked {} keywords from {} events since {}",
            ranked.len(),
            events.len(),
            since
        );
        Ok(ranked)
    }

    /// Hour-of-day search counts over the last `hours` hours
    pub async fn search_trend(&self, hours: u32) -> Result<Vec<TrendBucket>> {
        self.search_trend_at(hours, Utc::now()).await
    }

    /// Hour-of-day search counts over `[now - hours, now]`
    ///
    /// `hours == 0` yields an empty result without touching the source.
    ///
    /// # Errors
    ///
    /// Returns `HotsearchError::Validation` if `hours` exceeds
    /// `max_trend_hours`.
    pub async fn search_trend_at(
        &self,
        hours: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrendBucket>> {
        if hours == 0 {
            return Ok(Vec::new());
        }
        if hours > self.config.max_trend_hours {
            return Err(HotsearchError::validation(format!(
                "hours must not exceed {}",
                self.config.max_trend_hours
            )));
        }

        let start = saturating_sub(now, Duration::hours(i64::from(hours)));
        let events = self.events_since(start).await?;

        let buckets = trend::hourly_trend(&events, start, now, hours);
        debug!(
            "Built {} trend buckets from {} events",
            buckets.len(),
            events.len()
        );
        Ok(buckets)
    }

    /// Keywords whose volume rose sharply in the last hour
    pub async fn detect_hotspots(&self) -> Result<Vec<Hotspot>> {
        self.detect_hotspots_at(Utc::now()).await
    }

    /// Keywords whose volume rose sharply in the hour ending at `now`
    pub async fn detect_hotspots_at(&self, now: DateTime<Utc>) -> Result<Vec<Hotspot>> {
        let since = saturating_sub(now, hotspot::window_length() * 2);
        let events = self.events_since(since).await?;

        let hotspots = hotspot::detect_hotspots(
            &events,
            now,
            self.config.hotspot_threshold_percent,
            self.config.max_hotspots,
        );
        if !hotspots.is_empty() {
            info!("Detected {} rising hotspots", hotspots.len());
        }
        Ok(hotspots)
    }

    /// Newest recorded searches, newest first
    pub async fn recent_searches(&self) -> Result<Vec<RecordedSearch>> {
        self.source.fetch_most_recent(self.config.recent_limit).await
    }

    async fn events_since(&self, since: DateTime<Utc>) -> Result<Vec<RecordedSearch>> {
        if self.config.push_down_time_filter {
            self.source.fetch_events_since(since).await
        } else {
            let mut events = self.source.fetch_all_events().await?;
            events.retain(|record| record.timestamp() >= since);
            Ok(events)
        }
    }
}
