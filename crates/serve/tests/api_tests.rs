//! HTTP API integration tests
//!
//! Drive the full router (routes plus middleware) with in-memory stores.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use hotsearch_core::config::{AnalyticsConfig, ServerSettings};
use hotsearch_core::store::{EventSource, MemoryEventStore};
use hotsearch_core::{AnalyticsEngine, HotsearchError, RecordedSearch, SearchEvent};
use hotsearch_serve::{create_app, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app_with_store(store: MemoryEventStore) -> Router {
    let engine = AnalyticsEngine::new(Arc::new(store), AnalyticsConfig::default());
    create_app(AppState::new(engine, ServerSettings::default()))
}

fn event(keyword: &str, minutes_ago: i64) -> SearchEvent {
    SearchEvent::new(
        keyword,
        "10.0.0.1",
        "pc",
        Utc::now() - Duration::minutes(minutes_ago),
    )
    .unwrap()
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

/// Event source whose every call fails
struct UnavailableSource;

#[async_trait]
impl EventSource for UnavailableSource {
    async fn fetch_events_since(
        &self,
        _since: DateTime<Utc>,
    ) -> hotsearch_core::Result<Vec<RecordedSearch>> {
        Err(HotsearchError::store("database unreachable"))
    }

    async fn fetch_all_events(&self) -> hotsearch_core::Result<Vec<RecordedSearch>> {
        Err(HotsearchError::store("database unreachable"))
    }

    async fn append(&self, _event: SearchEvent) -> hotsearch_core::Result<RecordedSearch> {
        Err(HotsearchError::timeout("append"))
    }

    async fn fetch_most_recent(
        &self,
        _limit: usize,
    ) -> hotsearch_core::Result<Vec<RecordedSearch>> {
        Err(HotsearchError::store("database unreachable"))
    }
}

fn unavailable_app() -> Router {
    let engine = AnalyticsEngine::new(Arc::new(UnavailableSource), AnalyticsConfig::default());
    create_app(AppState::new(engine, ServerSettings::default()))
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get(app_with_store(MemoryEventStore::new()), "/api/search/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "hotsearch");
    assert!(body["timestamp"].is_string());
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_record_search_returns_provider_url() {
    let store = MemoryEventStore::new();
    let app = app_with_store(store.clone());

    let request = Request::builder()
        .uri("/api/search?keyword=%20rust%20lang%20&source=mobile")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["keyword"], "rust lang");
    assert_eq!(body["search_url"], "https://www.baidu.com/s?wd=rust+lang");

    let stored = store.fetch_all_events().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].event.ip, "203.0.113.7");
    assert_eq!(stored[0].event.source, "mobile");
}

#[tokio::test]
async fn test_record_search_without_peer_or_headers() {
    let store = MemoryEventStore::new();
    let (status, _) = get(app_with_store(store.clone()), "/api/search?keyword=rust").await;

    assert_eq!(status, StatusCode::OK);
    let stored = store.fetch_all_events().await.unwrap();
    assert_eq!(stored[0].event.ip, "unknown");
    assert_eq!(stored[0].event.source, "pc");
}

#[tokio::test]
async fn test_record_search_ignores_oversized_forwarded_for() {
    let store = MemoryEventStore::new();
    let forwarded = format!("{}, 10.0.0.1", "f".repeat(61));

    let request = Request::builder()
        .uri("/api/search?keyword=rust")
        .header("x-forwarded-for", forwarded)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app_with_store(store.clone()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keyword"], "rust");
    let stored = store.fetch_all_events().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].event.ip, "unknown");
}

#[tokio::test]
async fn test_record_search_rejects_blank_keyword() {
    let store = MemoryEventStore::new();

    let (status, body) = get(app_with_store(store.clone()), "/api/search?keyword=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Keyword"));

    let (status, _) = get(app_with_store(store.clone()), "/api/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_hot_keywords() {
    let store = MemoryEventStore::with_events(vec![
        event("rust", 5),
        event("go", 5),
        event("rust", 10),
        event("zig", 60),
        event("rust", 60 * 24 * 8),
    ]);
    let app = app_with_store(store);

    let (status, body) = get(app.clone(), "/api/search/hot").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["rust", "go", "zig"]));

    let (status, body) = get(app, "/api/search/hot/detail").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["keyword"], "rust");
    assert_eq!(body[0]["count"], 2);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_trend_defaults_to_a_day() {
    let app = app_with_store(MemoryEventStore::new());

    let (status, body) = get(app.clone(), "/api/search/trend").await;
    assert_eq!(status, StatusCode::OK);
    let buckets = body.as_array().unwrap();
    assert_eq!(buckets.len(), 24);
    assert_eq!(buckets[0]["hour_offset"], 0);
    assert_eq!(buckets[23]["hour_offset"], 23);

    let (status, body) = get(app, "/api/search/trend?hours=6").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_trend_hours_bounds() {
    let app = app_with_store(MemoryEventStore::new());

    let (status, body) = get(app.clone(), "/api/search/trend?hours=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));

    let (status, body) = get(app.clone(), "/api/search/trend?hours=-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));

    let (status, body) = get(app.clone(), "/api/search/trend?hours=169").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = get(app.clone(), "/api/search/trend?hours=99999999999").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(app, "/api/search/trend?hours=soon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_trend_counts_recent_event() {
    let store = MemoryEventStore::with_events(vec![event("rust", 0)]);
    let (status, body) = get(app_with_store(store), "/api/search/trend?hours=24").await;

    assert_eq!(status, StatusCode::OK);
    let total: u64 = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_hotspots() {
    let mut events = Vec::new();
    for _ in 0..4 {
        events.push(event("rising", 10));
    }
    for _ in 0..2 {
        events.push(event("rising", 90));
    }
    for _ in 0..5 {
        events.push(event("brand-new", 10));
    }
    let (status, body) = get(
        app_with_store(MemoryEventStore::with_events(events)),
        "/api/search/hotspots",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let hotspots = body.as_array().unwrap();
    assert_eq!(hotspots.len(), 1);
    assert_eq!(hotspots[0]["keyword"], "rising");
    assert_eq!(hotspots[0]["recent_count"], 4);
    assert_eq!(hotspots[0]["previous_count"], 2);
    assert_eq!(hotspots[0]["growth_rate_percent"], 100.0);
}

#[tokio::test]
async fn test_recent_searches_newest_first() {
    let events: Vec<SearchEvent> = (0..12)
        .map(|i| event(&format!("kw{}", i), 12 - i))
        .collect();
    let (status, body) = get(
        app_with_store(MemoryEventStore::with_events(events)),
        "/api/search/recent",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let recent = body.as_array().unwrap();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0]["keyword"], "kw11");
    assert_eq!(recent[9]["keyword"], "kw2");
    assert!(recent[0]["id"].is_i64());
}

#[tokio::test]
async fn test_store_failures_map_to_status_codes() {
    for uri in [
        "/api/search/hot",
        "/api/search/hot/detail",
        "/api/search/trend",
        "/api/search/hotspots",
        "/api/search/recent",
    ] {
        let (status, body) = get(unavailable_app(), uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("database unreachable"));
    }

    let (status, _) = get(unavailable_app(), "/api/search?keyword=rust").await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = get(app_with_store(MemoryEventStore::new()), "/api/other").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
