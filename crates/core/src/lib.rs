//! Hotsearch Core Library
//!
//! Search keyword analytics: recording search events and deriving top
//! keywords, hour-of-day trends and rising hotspots from them.

pub mod analytics;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use analytics::AnalyticsEngine;
pub use config::{AnalyticsConfig, HotsearchConfig, StoreBackend, StoreConfig};
pub use error::{ErrorCategory, HotsearchError, Result};
pub use store::{EventSource, MemoryEventStore, PgEventStore};
pub use types::{Hotspot, KeywordCount, RecordedSearch, SearchEvent, TrendBucket};

/// Initialize logging with custom configuration
///
/// `level` is an `EnvFilter` directive such as `info` or
/// `hotsearch_core=debug,tower_http=info`. Fails if a global subscriber is
/// already installed.
pub fn init_logging_with_config(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_new(level).map_err(|e| {
        HotsearchError::validation(format!("Invalid log level '{}': {}", level, e))
    })?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        "text" | "pretty" => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init(),
        "compact" => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
        _ => {
            return Err(HotsearchError::validation(format!(
                "Unknown log format: {}",
                format
            )));
        }
    };

    result.map_err(|e| HotsearchError::invalid_state(e.to_string()))
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version info as a formatted string
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _: Result<()> = Ok(());
        let _engine = AnalyticsEngine::new(
            std::sync::Arc::new(MemoryEventStore::new()),
            AnalyticsConfig::default(),
        );
        let _config = HotsearchConfig::default();
    }

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert!(info.contains("hotsearch-core"));
        assert!(info.contains('v'));
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let err = init_logging_with_config("info", "xml").unwrap_err();
        assert!(matches!(err, HotsearchError::Validation { .. }));
    }

    #[test]
    fn test_logging_init() {
        // A subscriber may already be installed by another test
        match init_logging_with_config("debug", "compact") {
            Ok(()) => {}
            Err(e) => assert!(matches!(e, HotsearchError::InvalidState { .. })),
        }
    }
}
