//! Route table for the search analytics API

use crate::handlers::{
    handle_health, handle_hot_keywords, handle_hot_keywords_detail, handle_hotspots,
    handle_recent_searches, handle_record_search, handle_search_trend, AppState,
};
use axum::{routing::get, Router};

/// Prefix every endpoint is mounted under
pub const API_PREFIX: &str = "/api/search";

/// API routes configuration
pub fn create_routes() -> Router<AppState> {
    let search = Router::new()
        .route("/", get(handle_record_search))
        .route("/hot", get(handle_hot_keywords))
        .route("/hot/detail", get(handle_hot_keywords_detail))
        .route("/trend", get(handle_search_trend))
        .route("/recent", get(handle_recent_searches))
        .route("/hotspots", get(handle_hotspots))
        .route("/health", get(handle_health));

    Router::new().nest(API_PREFIX, search)
}
