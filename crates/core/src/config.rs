//! Configuration types for the Hotsearch core library

use crate::{HotsearchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Environment variable prefix for overrides (`HOTSEARCH__ANALYTICS__DAYS=3`)
pub const ENV_PREFIX: &str = "HOTSEARCH";
/// Separator between nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Upper bound for the ranking lookback, in days
const MAX_DAYS: u32 = 36_500;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HotsearchConfig {
    /// Analytics engine settings
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Event store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analytics engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsConfig {
    /// Number of keywords returned by the ranking queries
    #[serde(default = "default_top_count")]
    pub top_count: usize,
    /// Ranking lookback window in days
    #[serde(default = "default_days")]
    pub days: u32,
    /// Maximum number of hotspots returned
    #[serde(default = "default_max_hotspots")]
    pub max_hotspots: usize,
    /// Growth (in whole percent) a keyword must exceed to count as a hotspot
    #[serde(default = "default_hotspot_threshold")]
    pub hotspot_threshold_percent: i64,
    /// Number of records returned by the recent-searches listing
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// Largest `hours` the trend endpoint accepts
    #[serde(default = "default_max_trend_hours")]
    pub max_trend_hours: u32,
    /// Ask the store for time-bounded slices instead of every event
    #[serde(default = "default_true")]
    pub push_down_time_filter: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_count: default_top_count(),
            days: default_days(),
            max_hotspots: default_max_hotspots(),
            hotspot_threshold_percent: default_hotspot_threshold(),
            recent_limit: default_recent_limit(),
            max_trend_hours: default_max_trend_hours(),
            push_down_time_filter: true,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whether to attach a permissive CORS layer
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    /// Maximum request body size in bytes
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
    /// External search page; the keyword is appended as the `wd` parameter
    #[serde(default = "default_search_provider_url")]
    pub search_provider_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            max_request_size: default_max_request_size(),
            search_provider_url: default_search_provider_url(),
        }
    }
}

/// Which event store backs the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store, lost on exit
    #[default]
    Memory,
    /// PostgreSQL via sqlx
    Postgres,
}

/// Event store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Store implementation
    #[serde(default)]
    pub backend: StoreBackend,
    /// Connection string, required for the postgres backend
    #[serde(default)]
    pub database_url: Option<String>,
    /// Maximum pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Per-query timeout in seconds
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database_url: None,
            max_connections: default_max_connections(),
            query_timeout_secs: default_query_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format (json, pretty, text, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl HotsearchConfig {
    /// Load configuration from an optional file plus environment overrides
    ///
    /// The file format follows its extension (yaml, json, toml). Environment
    /// variables prefixed with `HOTSEARCH__` override file values.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            let path = path.as_ref();
            if !path.exists() {
                return Err(HotsearchError::not_found(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Load configuration from a file without environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        // Try YAML first, then JSON
        match serde_yaml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(_) => {
                let config = serde_json::from_str(&content)?;
                Ok(config)
            }
        }
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let analytics = &self.analytics;

        if analytics.days > MAX_DAYS {
            return Err(HotsearchError::validation(format!(
                "analytics.days cannot exceed {}",
                MAX_DAYS
            )));
        }

        if analytics.max_trend_hours == 0 {
            return Err(HotsearchError::validation(
                "analytics.max_trend_hours must be greater than 0",
            ));
        }

        if analytics.hotspot_threshold_percent < 0 {
            return Err(HotsearchError::validation(
                "analytics.hotspot_threshold_percent cannot be negative",
            ));
        }

        if self.server.search_provider_url.trim().is_empty() {
            return Err(HotsearchError::validation(
                "server.search_provider_url cannot be empty",
            ));
        }
        let provider = Url::parse(&self.server.search_provider_url)?;
        if provider.scheme() != "http" && provider.scheme() != "https" {
            return Err(HotsearchError::validation(
                "server.search_provider_url must use http or https scheme",
            ));
        }

        if self.store.backend == StoreBackend::Postgres
            && self
                .store
                .database_url
                .as_deref()
                .map_or(true, |u| u.trim().is_empty())
        {
            return Err(HotsearchError::validation(
                "store.database_url is required for the postgres backend",
            ));
        }

        if self.store.query_timeout_secs == 0 {
            return Err(HotsearchError::validation(
                "store.query_timeout_secs must be greater than 0",
            ));
        }

        if !["json", "pretty", "text", "compact"].contains(&self.logging.format.as_str()) {
            return Err(HotsearchError::validation(format!(
                "Unknown log format: {}",
                self.logging.format
            )));
        }

        Ok(())
    }
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_top_count() -> usize {
    10
}
fn default_days() -> u32 {
    7
}
fn default_max_hotspots() -> usize {
    10
}
fn default_hotspot_threshold() -> i64 {
    50
}
fn default_recent_limit() -> usize {
    10
}
fn default_max_trend_hours() -> u32 {
    168
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_request_size() -> usize {
    64 * 1024
}
fn default_search_provider_url() -> String {
    "https://www.baidu.com/s".to_string()
}
fn default_max_connections() -> u32 {
    5
}
fn default_query_timeout() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
