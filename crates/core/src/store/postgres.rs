//! PostgreSQL event store
//!
//! Stores one row per search in `search_records`. Queries are built at
//! runtime so the crate compiles without a live database.

use super::EventSource;
use crate::config::StoreConfig;
use crate::types::{RecordedSearch, SearchEvent, DEFAULT_SOURCE};
use crate::{HotsearchError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS search_records (
        id BIGSERIAL PRIMARY KEY,
        keyword VARCHAR(255) NOT NULL,
        ip VARCHAR(45),
        search_time TIMESTAMPTZ NOT NULL,
        source VARCHAR(20),
        is_hot BOOLEAN NOT NULL DEFAULT FALSE
    )
"#;

const CREATE_TIME_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_search_records_search_time
    ON search_records (search_time)
"#;

/// Event store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgEventStore {
    /// Wraps an existing pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sqlx::PgPool;
    /// use std::time::Duration;
    /// use hotsearch_core::store::PgEventStore;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = PgPool::connect("postgresql://localhost/hotsearch").await?;
    /// let store = PgEventStore::new(pool, Duration::from_secs(10));
    /// store.migrate().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Opens a pool using the store settings
    ///
    /// # Errors
    ///
    /// Returns `HotsearchError::Database` if the URL is malformed or the
    /// server refuses the connection, `HotsearchError::Timeout` if connecting
    /// takes longer than the query timeout.
    pub async fn connect(database_url: &str, config: &StoreConfig) -> Result<Self> {
        let query_timeout = Duration::from_secs(config.query_timeout_secs);
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(query_timeout)
            .connect(database_url)
            .await?;

        info!(
            "Connected to PostgreSQL event store (max {} connections)",
            config.max_connections
        );
        Ok(Self::new(pool, query_timeout))
    }

    /// Creates the table and index if they do not exist
    pub async fn migrate(&self) -> Result<()> {
        self.timed("migrate", sqlx::query(CREATE_TABLE).execute(&self.pool))
            .await?;
        self.timed(
            "migrate",
            sqlx::query(CREATE_TIME_INDEX).execute(&self.pool),
        )
        .await?;

        debug!("search_records schema is up to date");
        Ok(())
    }

    async fn timed<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(HotsearchError::timeout(operation)),
        }
    }
}

fn record_from_row(row: &PgRow) -> Result<RecordedSearch> {
    let id: i64 = row.try_get("id")?;
    let keyword: String = row.try_get("keyword")?;
    let ip: Option<String> = row.try_get("ip")?;
    let timestamp: DateTime<Utc> = row.try_get("search_time")?;
    let source: Option<String> = row.try_get("source")?;

    Ok(RecordedSearch {
        id,
        event: SearchEvent {
            keyword,
            ip: ip.unwrap_or_default(),
            timestamp,
            source: source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        },
    })
}

fn records_from_rows(rows: &[PgRow]) -> Result<Vec<RecordedSearch>> {
    rows.iter().map(record_from_row).collect()
}

#[async_trait]
impl EventSource for PgEventStore {
    async fn fetch_events_since(&self, since: DateTime<Utc>) -> Result<Vec<RecordedSearch>> {
        let rows = self
            .timed(
                "fetch_events_since",
                sqlx::query(
                    r#"
                    SELECT id, keyword, ip, search_time, source
                    FROM search_records
                    WHERE search_time >= $1
                    "#,
                )
                .bind(since)
                .fetch_all(&self.pool),
            )
            .await?;

        debug!("Fetched {} events since {}", rows.len(), since);
        records_from_rows(&rows)
    }

    async fn fetch_all_events(&self) -> Result<Vec<RecordedSearch>> {
        let rows = self
            .timed(
                "fetch_all_events",
                sqlx::query("SELECT id, keyword, ip, search_time, source FROM search_records")
                    .fetch_all(&self.pool),
            )
            .await?;

        debug!("Fetched {} events", rows.len());
        records_from_rows(&rows)
    }

    async fn append(&self, event: SearchEvent) -> Result<RecordedSearch> {
        let row = self
            .timed(
                "append",
                sqlx::query(
                    r#"
                    INSERT INTO search_records (keyword, ip, search_time, source)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(&event.keyword)
                .bind(&event.ip)
                .bind(event.timestamp)
                .bind(&event.source)
                .fetch_one(&self.pool),
            )
            .await?;

        let id: i64 = row.try_get("id")?;
        debug!("Stored search event {} ({})", id, event.keyword);
        Ok(RecordedSearch { id, event })
    }

    async fn fetch_most_recent(&self, limit: usize) -> Result<Vec<RecordedSearch>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .timed(
                "fetch_most_recent",
                sqlx::query(
                    r#"
                    SELECT id, keyword, ip, search_time, source
                    FROM search_records
                    ORDER BY search_time DESC, id DESC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool),
            )
            .await?;

        records_from_rows(&rows)
    }
}
