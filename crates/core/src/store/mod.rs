//! Event stores
//!
//! The analytics engine never touches storage directly. It asks an
//! [`EventSource`] for events and aggregates whatever comes back in memory.
//!
//! - `memory`: process-local store for tests, demos and single-node use
//! - `postgres`: durable store on top of `sqlx::PgPool`

pub mod memory;
pub mod postgres;

use crate::config::{StoreBackend, StoreConfig};
use crate::types::{RecordedSearch, SearchEvent};
use crate::{HotsearchError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub use memory::MemoryEventStore;
pub use postgres::PgEventStore;

/// Source and sink of search events
///
/// Implementations must tolerate concurrent appends and reads. The engine
/// places no ordering requirement between a write and a later read beyond
/// eventual visibility.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events with `timestamp >= since`, in any order
    async fn fetch_events_since(&self, since: DateTime<Utc>) -> Result<Vec<RecordedSearch>>;

    /// Every stored event, in any order
    async fn fetch_all_events(&self) -> Result<Vec<RecordedSearch>>;

    /// Persist one event and return it with its assigned identity
    async fn append(&self, event: SearchEvent) -> Result<RecordedSearch>;

    /// The `limit` newest events, newest first
    async fn fetch_most_recent(&self, limit: usize) -> Result<Vec<RecordedSearch>>;
}

/// Builds the event source selected by `config.backend`
///
/// The postgres backend connects and runs its schema migration before
/// returning.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn EventSource>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory event store");
            Ok(Arc::new(MemoryEventStore::new()))
        }
        StoreBackend::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                HotsearchError::validation("store.database_url is required for postgres")
            })?;
            let store = PgEventStore::connect(url, config).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
    }
}
