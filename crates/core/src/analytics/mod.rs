//! Search analytics
//!
//! The submodules hold pure aggregation functions over slices of
//! [`RecordedSearch`](crate::types::RecordedSearch); [`AnalyticsEngine`] wires
//! them to an event source.

pub mod engine;
pub mod hotspot;
pub mod ranking;
pub mod trend;

pub use engine::AnalyticsEngine;

use chrono::{DateTime, Duration, Utc};

/// `at - span`, clamped to the earliest representable instant
pub(crate) fn saturating_sub(at: DateTime<Utc>, span: Duration) -> DateTime<Utc> {
    at.checked_sub_signed(span)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_saturating_sub_clamps() {
        let now = Utc.with_ymd_and_hms(2024, 5, 8, 15, 0, 0).unwrap();
        assert_eq!(
            saturating_sub(now, Duration::days(365 * 1_000_000)),
            DateTime::<Utc>::MIN_UTC
        );
        assert_eq!(saturating_sub(now, Duration::hours(1)), now - Duration::hours(1));
    }
}
