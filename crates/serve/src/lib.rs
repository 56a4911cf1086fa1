//! Hotsearch Serve Library
//!
//! HTTP interface for recording searches and querying search analytics.

pub mod api;
pub mod client_ip;
pub mod error;
pub mod handlers;
pub mod server;

pub use api::{create_routes, API_PREFIX};
pub use error::ApiError;
pub use handlers::AppState;
pub use server::{create_app, HotsearchServer, ServerBuilder};

/// Server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
