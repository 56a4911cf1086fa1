//! Server module for the Hotsearch serve crate

use crate::api::create_routes;
use crate::handlers::AppState;
use axum::{
    http::{header::ACCEPT, header::CONTENT_TYPE, Method},
    Router,
};
use hotsearch_core::config::{HotsearchConfig, ServerSettings};
use hotsearch_core::{store, AnalyticsEngine, HotsearchError, Result};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Hotsearch HTTP server
pub struct HotsearchServer {
    settings: ServerSettings,
    app: Router,
}

impl HotsearchServer {
    /// Connect the configured store and build the application
    pub async fn new(config: HotsearchConfig) -> Result<Self> {
        let source = store::connect(&config.store).await?;
        let engine = AnalyticsEngine::new(source, config.analytics.clone());
        Ok(Self::with_engine(engine, config.server))
    }

    /// Build a server around an existing engine
    pub fn with_engine(engine: AnalyticsEngine, settings: ServerSettings) -> Self {
        let app = create_app(AppState::new(engine, settings.clone()));
        Self { settings, app }
    }

    /// Start the server, returning once ctrl-c is received
    pub async fn start(self) -> Result<()> {
        let addr = format!("{}:{}", self.settings.host, self.settings.port);
        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| HotsearchError::validation(format!("Invalid address {}: {}", addr, e)))?;

        tracing::info!("Starting Hotsearch server on {}", addr);

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;

        axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Hotsearch server stopped");
        Ok(())
    }

    /// Get the server settings
    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }
}

/// Create the Axum application with middleware
pub fn create_app(state: AppState) -> Router {
    let settings = state.settings.clone();
    let mut app = create_routes().with_state(state);

    app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(settings.max_request_size)),
    );

    if settings.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers([ACCEPT, CONTENT_TYPE]);

        app = app.layer(cors);
    }

    app
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Server builder for configuration
pub struct ServerBuilder {
    config: HotsearchConfig,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: HotsearchConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: HotsearchConfig) -> Self {
        Self { config }
    }

    /// Set the host address
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set the search provider URL
    pub fn search_provider_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.server.search_provider_url = url.into();
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.config.server.cors_enabled = enabled;
        self
    }

    /// Set maximum request size
    pub fn max_request_size(mut self, size: usize) -> Self {
        self.config.server.max_request_size = size;
        self
    }

    /// Build the server, connecting the configured store
    pub async fn build(self) -> Result<HotsearchServer> {
        HotsearchServer::new(self.config).await
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
