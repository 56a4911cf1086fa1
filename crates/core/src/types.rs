//! Search event and analytics result types
//!
//! `SearchEvent` is what gets written, `RecordedSearch` is what a store hands
//! back, and the remaining types are derived per query and never persisted.

use crate::{HotsearchError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum keyword length in characters
pub const MAX_KEYWORD_LEN: usize = 255;
/// Maximum client address length (fits an IPv6 text form)
pub const MAX_IP_LEN: usize = 45;
/// Maximum source tag length
pub const MAX_SOURCE_LEN: usize = 20;
/// Source tag used when the caller supplies none
pub const DEFAULT_SOURCE: &str = "pc";

/// One recorded search action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchEvent {
    /// Trimmed, non-empty keyword
    pub keyword: String,
    /// Client address the search came from
    pub ip: String,
    /// When the search happened
    pub timestamp: DateTime<Utc>,
    /// Origin tag (pc, mobile, ...)
    pub source: String,
}

impl SearchEvent {
    /// Builds a validated event
    ///
    /// The keyword is trimmed; an empty source falls back to
    /// [`DEFAULT_SOURCE`].
    ///
    /// # Errors
    ///
    /// Returns `HotsearchError::Validation` if the trimmed keyword is empty or
    /// any field exceeds its column limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use hotsearch_core::types::SearchEvent;
    ///
    /// let event = SearchEvent::new("  rust  ", "10.0.0.1", "", Utc::now()).unwrap();
    /// assert_eq!(event.keyword, "rust");
    /// assert_eq!(event.source, "pc");
    /// ```
    pub fn new(
        keyword: &str,
        ip: &str,
        source: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(HotsearchError::validation("Keyword cannot be empty"));
        }
        if keyword.chars().count() > MAX_KEYWORD_LEN {
            return Err(HotsearchError::validation(format!(
                "Keyword cannot exceed {} characters",
                MAX_KEYWORD_LEN
            )));
        }
        if ip.chars().count() > MAX_IP_LEN {
            return Err(HotsearchError::validation(format!(
                "IP cannot exceed {} characters",
                MAX_IP_LEN
            )));
        }

        let source = match source.trim() {
            "" => DEFAULT_SOURCE,
            s => s,
        };
        if source.chars().count() > MAX_SOURCE_LEN {
            return Err(HotsearchError::validation(format!(
                "Source cannot exceed {} characters",
                MAX_SOURCE_LEN
            )));
        }

        Ok(Self {
            keyword: keyword.to_string(),
            ip: ip.to_string(),
            timestamp,
            source: source.to_string(),
        })
    }
}

/// A search event together with the identity the store assigned to it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedSearch {
    /// Store-assigned identity
    pub id: i64,
    #[serde(flatten)]
    pub event: SearchEvent,
}

impl RecordedSearch {
    pub fn keyword(&self) -> &str {
        &self.event.keyword
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.event.timestamp
    }
}

/// Keyword with its occurrence count inside a window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u64,
}

/// Number of searches that fell into one hour-of-day slot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendBucket {
    pub hour_offset: u32,
    pub count: u64,
}

/// A keyword whose volume in the last hour grew sharply over the hour before
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hotspot {
    pub keyword: String,
    pub recent_count: u64,
    pub previous_count: u64,
    pub growth_rate_percent: f64,
}
