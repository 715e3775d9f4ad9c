//! Window bounds and hour-bucket assignment
//!
//! Time windows used by the aggregator. Bounds are start-inclusive and
//! end-exclusive, so adjacent buckets never double-count an event.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::fmt;

/// Number of buckets in the hourly histogram.
pub const HOUR_BUCKETS: usize = 24;

/// The time bounds of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowBounds {
    /// Start time of the window (inclusive)
    pub start: DateTime<Utc>,
    /// End time of the window (exclusive)
    pub end: DateTime<Utc>,
}

impl WindowBounds {
    /// Create new window bounds.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start < end, "Window start must be before end");
        Self { start, end }
    }

    /// Get the duration of the window.
    pub fn duration(&self) -> Duration {
        self.end.signed_duration_since(self.start)
    }

    /// Check if a timestamp falls within this window.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

impl fmt::Display for WindowBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} - {})",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Truncate a timestamp to the top of its clock hour.
pub fn truncate_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let secs = timestamp.timestamp();
    let aligned = secs - secs.rem_euclid(3600);
    // Alignment can only move the timestamp earlier, so this stays in range.
    Utc.timestamp_opt(aligned, 0).unwrap()
}

/// Build the 24 clock-aligned hour buckets covering the trailing 24 hours
/// ending at `now`, oldest first.
///
/// Bucket `i` spans `[truncate_to_hour(now - (23 - i)h), +1h)`. The buckets
/// are contiguous and non-overlapping; the newest one contains `now`.
pub fn trailing_hour_buckets(now: DateTime<Utc>) -> Vec<WindowBounds> {
    (0..HOUR_BUCKETS)
        .map(|i| {
            let hours_back = (HOUR_BUCKETS - 1 - i) as i64;
            let start = truncate_to_hour(now - Duration::hours(hours_back));
            WindowBounds::new(start, start + Duration::hours(1))
        })
        .collect()
}
