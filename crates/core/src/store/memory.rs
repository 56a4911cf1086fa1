//! In-memory event store

use super::EventSource;
use crate::types::{RecordedSearch, SearchEvent};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Event store that keeps everything in process memory
///
/// Cloning is cheap and clones share the same events.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    events: Vec<RecordedSearch>,
    last_id: i64,
}

impl MemoryEventStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `events`, ids assigned in order
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use hotsearch_core::store::MemoryEventStore;
    /// use hotsearch_core::types::SearchEvent;
    ///
    /// # async fn example() {
    /// let event = SearchEvent::new("rust", "10.0.0.1", "pc", Utc::now()).unwrap();
    /// let store = MemoryEventStore::with_events(vec![event]);
    /// assert_eq!(store.len().await, 1);
    /// # }
    /// ```
    pub fn with_events(events: Vec<SearchEvent>) -> Self {
        let mut state = MemoryState::default();
        for event in events {
            state.last_id += 1;
            state.events.push(RecordedSearch {
                id: state.last_id,
                event,
            });
        }

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Number of stored events
    pub async fn len(&self) -> usize {
        self.state.read().await.events.len()
    }

    /// Whether the store holds no events
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.events.is_empty()
    }
}

#[async_trait]
impl EventSource for MemoryEventStore {
    async fn fetch_events_since(&self, since: DateTime<Utc>) -> Result<Vec<RecordedSearch>> {
        let state = self.state.read().await;
        Ok(state
            .events
            .iter()
            .filter(|record| record.timestamp() >= since)
            .cloned()
            .collect())
    }

    async fn fetch_all_events(&self) -> Result<Vec<RecordedSearch>> {
        Ok(self.state.read().await.events.clone())
    }

    async fn append(&self, event: SearchEvent) -> Result<RecordedSearch> {
        let mut state = self.state.write().await;
        state.last_id += 1;

        let record = RecordedSearch {
            id: state.last_id,
            event,
        };
        state.events.push(record.clone());

        debug!("Stored search event {} ({})", record.id, record.keyword());
        Ok(record)
    }

    async fn fetch_most_recent(&self, limit: usize) -> Result<Vec<RecordedSearch>> {
        let state = self.state.read().await;
        let mut records = state.events.clone();
        drop(state);

        records.sort_by(|a, b| {
            b.timestamp()
                .cmp(&a.timestamp())
                .then_with(|| b.id.cmp(&a.id))
        });
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn event_at(keyword: &str, timestamp: DateTime<Utc>) -> SearchEvent {
        SearchEvent::new(keyword, "10.0.0.1", "pc", timestamp).unwrap()
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let store = MemoryEventStore::new();
        let first = store.append(event_at("rust", base_time())).await.unwrap();
        let second = store.append(event_at("rust", base_time())).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.event, second.event);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_fetch_events_since_is_inclusive() {
        let t = base_time();
        let store = MemoryEventStore::with_events(vec![
            event_at("old", t - Duration::seconds(1)),
            event_at("edge", t),
            event_at("new", t + Duration::minutes(5)),
        ]);

        let events = store.fetch_events_since(t).await.unwrap();
        let keywords: Vec<&str> = events.iter().map(|r| r.keyword()).collect();
        assert_eq!(keywords, vec!["edge", "new"]);
    }

    #[tokio::test]
    async fn test_fetch_most_recent_orders_newest_first() {
        let t = base_time();
        let store = MemoryEventStore::with_events(vec![
            event_at("a", t),
            event_at("b", t + Duration::minutes(2)),
            event_at("c", t + Duration::minutes(1)),
            event_at("d", t + Duration::minutes(2)),
        ]);

        let recent = store.fetch_most_recent(3).await.unwrap();
        let keywords: Vec<&str> = recent.iter().map(|r| r.keyword()).collect();
        assert_eq!(keywords, vec!["d", "b", "c"]);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryEventStore::new();
        let clone = store.clone();
        clone.append(event_at("shared", base_time())).await.unwrap();

        assert!(!store.is_empty().await);
        assert_eq!(store.fetch_all_events().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends() {
        let store = MemoryEventStore::new();
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(event_at(&format!("k{}", i % 4), base_time()))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut ids: Vec<i64> = store
            .fetch_all_events()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    }
}
