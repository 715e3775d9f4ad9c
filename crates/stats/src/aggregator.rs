//! Stats aggregator
//!
//! Computes `EventStats` over a trailing window from a consistent store
//! snapshot. Four of the five statistics honor the caller's window; the
//! hourly histogram always uses its own trailing 24 hours (observed
//! behavior of the system this one replaces — kept deliberately, see
//! DESIGN.md).

use chrono::{DateTime, Duration, Utc};
use pulse_types::{event::event_types, EventStats, Result, StoredEvent};
use std::sync::Arc;
use store::EventStore;
use tracing::debug;

use crate::accumulate::{HourHistogram, TicketAverage, TypeCounter, UserValueTotals};

/// How many users the `top_users` ranking keeps.
pub const TOP_USERS: usize = 5;

/// Default aggregation window in hours.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// On-demand statistics aggregator over an event store.
#[derive(Clone)]
pub struct StatsAggregator {
    store: Arc<dyn EventStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Compute statistics for the trailing `window_hours` ending now.
    ///
    /// Always recomputes from a fresh snapshot; never cached.
    pub async fn compute_stats(&self, window_hours: i64) -> Result<EventStats> {
        let snapshot = self.store.snapshot().await?;
        Ok(compute_at(&snapshot, Utc::now(), window_hours))
    }
}

/// Pure aggregation over a snapshot, with "now" pinned by the caller.
///
/// One pass over the windowed set feeds the per-type counter, the per-user
/// totals, and the purchase average simultaneously; the histogram runs over
/// the full snapshot because its window is fixed at 24 hours regardless of
/// `window_hours`.
pub fn compute_at(
    snapshot: &[StoredEvent],
    now: DateTime<Utc>,
    window_hours: i64,
) -> EventStats {
    let cutoff = now - Duration::hours(window_hours);

    let mut total_events = 0u64;
    let mut by_type = TypeCounter::new();
    let mut user_totals = UserValueTotals::new();
    let mut ticket = TicketAverage::new();
    let mut histogram = HourHistogram::new(now);

    for event in snapshot {
        if event.timestamp >= cutoff {
            total_events += 1;
            by_type.record(&event.event_type);
            user_totals.record(&event.user_id, event.value);
            if event.event_type == event_types::PURCHASE {
                ticket.record(event.value);
            }
        }
        // Fixed trailing-24h window, independent of `window_hours`.
        histogram.record(event.timestamp);
    }

    debug!(
        window_hours,
        total_events,
        snapshot_len = snapshot.len(),
        "stats recomputed"
    );

    EventStats {
        total_events,
        events_by_type: by_type.finalize(),
        top_users: user_totals.top(TOP_USERS),
        average_ticket: ticket.finalize(),
        events_by_hour: histogram.finalize(),
        last_update: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_types::{EventFilter, NewEvent};
    use std::collections::HashMap;
    use store::MemoryEventStore;

    fn stored(user_id: &str, event_type: &str, value: f64, ts: &str) -> StoredEvent {
        StoredEvent::from_new(NewEvent {
            user_id: user_id.to_string(),
            event_type: event_type.to_string(),
            value,
            timestamp: ts.parse().unwrap(),
            metadata: HashMap::new(),
        })
    }

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_purchase_scenario() {
        let snapshot = vec![
            stored("u1", "purchase", 100.0, "2024-01-01T10:00:00Z"),
            stored("u1", "purchase", 50.0, "2024-01-01T11:00:00Z"),
        ];

        let stats = compute_at(&snapshot, ts("2024-01-01T12:00:00Z"), 24);

        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.events_by_type["purchase"], 2);
        assert_eq!(stats.events_by_type.len(), 1);
        assert_eq!(stats.top_users.len(), 1);
        assert_eq!(stats.top_users[0].user_id, "u1");
        assert_eq!(stats.top_users[0].value, 150.0);
        assert_eq!(stats.average_ticket, 75.0);
    }

    #[test]
    fn test_stats_conservation() {
        let snapshot = vec![
            stored("u1", "login", 0.0, "2024-01-01T09:00:00Z"),
            stored("u2", "click", 0.0, "2024-01-01T10:00:00Z"),
            stored("u3", "purchase", 20.0, "2024-01-01T11:00:00Z"),
            stored("u4", "click", 0.0, "2024-01-01T11:30:00Z"),
        ];

        let stats = compute_at(&snapshot, ts("2024-01-01T12:00:00Z"), 24);
        let by_type_sum: u64 = stats.events_by_type.values().sum();
        assert_eq!(by_type_sum, stats.total_events);
    }

    #[test]
    fn test_window_excludes_older_events() {
        let snapshot = vec![
            stored("u1", "purchase", 10.0, "2024-01-01T01:00:00Z"),
            stored("u2", "purchase", 30.0, "2024-01-01T11:30:00Z"),
        ];

        let stats = compute_at(&snapshot, ts("2024-01-01T12:00:00Z"), 1);

        assert_eq!(stats.total_events, 1);
        assert_eq!(stats.average_ticket, 30.0);
        assert_eq!(stats.top_users.len(), 1);
        assert_eq!(stats.top_users[0].user_id, "u2");
    }

    #[test]
    fn test_histogram_window_is_independent_of_window_hours() {
        let snapshot = vec![
            stored("u1", "click", 0.0, "2024-01-01T03:30:00Z"),
            stored("u2", "click", 0.0, "2024-01-01T11:30:00Z"),
        ];

        // A 1-hour window excludes the 03:30 event from the totals...
        let stats = compute_at(&snapshot, ts("2024-01-01T12:00:00Z"), 1);
        assert_eq!(stats.total_events, 1);

        // ...but the histogram still counts it: its window is always 24h.
        let histogram_total: u64 = stats.events_by_hour.iter().map(|b| b.count).sum();
        assert_eq!(histogram_total, 2);
    }

    #[test]
    fn test_average_ticket_zero_guard() {
        let snapshot = vec![stored("u1", "login", 0.0, "2024-01-01T11:00:00Z")];
        let stats = compute_at(&snapshot, ts("2024-01-01T12:00:00Z"), 24);

        assert_eq!(stats.average_ticket, 0.0);
        assert!(stats.average_ticket.is_finite());
    }

    #[test]
    fn test_top_users_bound_and_order() {
        let snapshot: Vec<StoredEvent> = (0..8)
            .map(|i| {
                stored(
                    &format!("u{i}"),
                    "purchase",
                    (i + 1) as f64 * 10.0,
                    "2024-01-01T11:00:00Z",
                )
            })
            .collect();

        let stats = compute_at(&snapshot, ts("2024-01-01T12:00:00Z"), 24);

        assert_eq!(stats.top_users.len(), TOP_USERS);
        for pair in stats.top_users.windows(2) {
            assert!(pair[0].value >= pair[1].value);
        }
        assert_eq!(stats.top_users[0].user_id, "u7");
    }

    #[test]
    fn test_hour_buckets_cover_trailing_24_hours() {
        let stats = compute_at(&[], ts("2024-01-02T15:45:00Z"), 24);

        assert_eq!(stats.events_by_hour.len(), 24);
        // Oldest first, clock-aligned, contiguous labels.
        assert_eq!(stats.events_by_hour[0].label, "16:00");
        assert_eq!(stats.events_by_hour[23].label, "15:00");
        let hours: Vec<u32> = stats.events_by_hour.iter().map(|b| b.hour).collect();
        for pair in hours.windows(2) {
            assert_eq!((pair[0] + 1) % 24, pair[1]);
        }
    }

    #[tokio::test]
    async fn test_aggregator_reflects_latest_store_state() {
        let store = Arc::new(MemoryEventStore::new());
        let aggregator = StatsAggregator::new(store.clone());

        let stats = aggregator.compute_stats(24).await.unwrap();
        assert_eq!(stats.total_events, 0);

        store
            .append(NewEvent {
                user_id: "u1".to_string(),
                event_type: "purchase".to_string(),
                value: 12.0,
                timestamp: Utc::now(),
                metadata: HashMap::new(),
            })
            .await
            .unwrap();

        // Recomputed fresh: the new event is visible without any cache
        // invalidation step.
        let stats = aggregator.compute_stats(24).await.unwrap();
        assert_eq!(stats.total_events, 1);
        assert_eq!(stats.average_ticket, 12.0);

        // The aggregator never mutates the store.
        assert_eq!(store.query(&EventFilter::default()).await.unwrap().len(), 1);
    }
}
