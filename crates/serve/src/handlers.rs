//! HTTP handlers for the search analytics API

use crate::client_ip::resolve_client_ip;
use crate::error::ApiError;
use axum::{
    extract::{rejection::QueryRejection, ConnectInfo, Query, State},
    http::HeaderMap,
    response::Json,
};
use chrono::{DateTime, Utc};
use hotsearch_core::config::ServerSettings;
use hotsearch_core::{
    AnalyticsEngine, HotsearchError, Hotspot, KeywordCount, RecordedSearch, TrendBucket,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use url::Url;

/// Hours covered by the trend endpoint when none are requested
pub const DEFAULT_TREND_HOURS: i64 = 24;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "hotsearch";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalyticsEngine>,
    pub settings: ServerSettings,
}

impl AppState {
    /// Create application state around an engine
    pub fn new(engine: AnalyticsEngine, settings: ServerSettings) -> Self {
        Self {
            engine: Arc::new(engine),
            settings,
        }
    }
}

/// Query parameters for recording a search
#[derive(Debug, Deserialize)]
pub struct RecordParams {
    pub keyword: Option<String>,
    pub source: Option<String>,
}

/// Response after recording a search
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    pub keyword: String,
    pub search_url: String,
    pub message: String,
}

/// Query parameters for the trend endpoint
#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub hours: Option<i64>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub version: String,
}

/// Records a search and returns the provider URL to redirect to
pub async fn handle_record_search(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(params): Query<RecordParams>,
) -> Result<Json<RecordResponse>, ApiError> {
    let ip = resolve_client_ip(&headers, peer.map(|ConnectInfo(addr)| addr));
    let keyword = params.keyword.unwrap_or_default();
    let source = params.source.unwrap_or_default();

    let record = state.engine.record_search(&keyword, &ip, &source).await?;
    let search_url = build_search_url(&state.settings.search_provider_url, &record.event.keyword)?;

    Ok(Json(RecordResponse {
        success: true,
        keyword: record.event.keyword,
        search_url,
        message: "Search recorded".to_string(),
    }))
}

/// Top keywords, most searched first
pub async fn handle_hot_keywords(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.engine.top_keywords().await?))
}

/// Top keywords with their counts
pub async fn handle_hot_keywords_detail(
    State(state): State<AppState>,
) -> Result<Json<Vec<KeywordCount>>, ApiError> {
    Ok(Json(state.engine.top_keywords_with_count().await?))
}

/// Hour-of-day search volume
pub async fn handle_search_trend(
    State(state): State<AppState>,
    params: Result<Query<TrendParams>, QueryRejection>,
) -> Result<Json<Vec<TrendBucket>>, ApiError> {
    let Query(params) = params.map_err(|e| HotsearchError::validation(e.body_text()))?;
    let hours = params.hours.unwrap_or(DEFAULT_TREND_HOURS);

    if hours <= 0 {
        return Ok(Json(Vec::new()));
    }
    let hours = u32::try_from(hours).map_err(|_| {
        HotsearchError::validation(format!(
            "hours must not exceed {}",
            state.engine.config().max_trend_hours
        ))
    })?;

    Ok(Json(state.engine.search_trend(hours).await?))
}

/// Newest recorded searches
pub async fn handle_recent_searches(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecordedSearch>>, ApiError> {
    Ok(Json(state.engine.recent_searches().await?))
}

/// Keywords rising sharply in the last hour
pub async fn handle_hotspots(
    State(state): State<AppState>,
) -> Result<Json<Vec<Hotspot>>, ApiError> {
    Ok(Json(state.engine.detect_hotspots().await?))
}

/// Health check endpoint
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        service: SERVICE_NAME.to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Provider URL with `keyword` as the `wd` query parameter
pub fn build_search_url(provider: &str, keyword: &str) -> hotsearch_core::Result<String> {
    let url = Url::parse_with_params(provider, &[("wd", keyword)])?;
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_search_url_encodes_keyword() {
        let url = build_search_url("https://www.baidu.com/s", "rust async").unwrap();
        assert_eq!(url, "https://www.baidu.com/s?wd=rust+async");

        let url = build_search_url("https://www.baidu.com/s", "a&b=c").unwrap();
        assert_eq!(url, "https://www.baidu.com/s?wd=a%26b%3Dc");
    }

    #[test]
    fn test_build_search_url_rejects_relative_provider() {
        let err = build_search_url("not a url", "rust").unwrap_err();
        assert!(matches!(err, HotsearchError::Url(_)));
    }
}
