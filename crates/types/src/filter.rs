//! Query-time event filter
//!
//! Filters compose by conjunction and are never persisted. Date bounds are
//! inclusive on the event `timestamp`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::StoredEvent;

/// Default number of events a query returns when no limit is given.
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Conjunctive event filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    /// Match `type` exactly. The literal `"all"` means no type filter.
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Match the actor exactly.
    pub user_id: Option<String>,
    /// Secondary dimension, matched against `metadata["severity"]`.
    pub severity: Option<String>,
    /// Inclusive lower bound on `timestamp`.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `timestamp`.
    pub end_date: Option<DateTime<Utc>>,
    /// Maximum number of events to return. Defaults to [`DEFAULT_QUERY_LIMIT`].
    pub limit: Option<usize>,
}

impl EventFilter {
    /// Filter for a single event type.
    pub fn by_type(event_type: impl Into<String>) -> Self {
        Self {
            event_type: Some(event_type.into()),
            ..Default::default()
        }
    }

    /// The effective limit for this filter.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_QUERY_LIMIT)
    }

    /// Whether an event satisfies every predicate of this filter.
    pub fn matches(&self, event: &StoredEvent) -> bool {
        if let Some(event_type) = &self.event_type {
            if event_type != "all" && *event_type != event.event_type {
                return false;
            }
        }

        if let Some(user_id) = &self.user_id {
            if *user_id != event.user_id {
                return false;
            }
        }

        if let Some(severity) = &self.severity {
            match event.metadata.get("severity") {
                Some(Value::String(s)) if s == severity => {}
                _ => return false,
            }
        }

        if let Some(start) = self.start_date {
            if event.timestamp < start {
                return false;
            }
        }

        if let Some(end) = self.end_date {
            if event.timestamp > end {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NewEvent;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::HashMap;

    fn event(user_id: &str, event_type: &str, ts: &str) -> StoredEvent {
        StoredEvent::from_new(NewEvent {
            user_id: user_id.to_string(),
            event_type: event_type.to_string(),
            value: 0.0,
            timestamp: ts.parse().unwrap(),
            metadata: HashMap::new(),
        })
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = EventFilter::default();
        assert!(filter.matches(&event("u1", "login", "2024-01-01T10:00:00Z")));
        assert_eq!(filter.effective_limit(), DEFAULT_QUERY_LIMIT);
    }

    #[test]
    fn test_filters_compose_by_conjunction() {
        let filter = EventFilter {
            event_type: Some("purchase".to_string()),
            user_id: Some("u1".to_string()),
            ..Default::default()
        };

        assert!(filter.matches(&event("u1", "purchase", "2024-01-01T10:00:00Z")));
        assert!(!filter.matches(&event("u2", "purchase", "2024-01-01T10:00:00Z")));
        assert!(!filter.matches(&event("u1", "login", "2024-01-01T10:00:00Z")));
    }

    #[test]
    fn test_type_all_means_no_type_filter() {
        let filter = EventFilter::by_type("all");
        assert!(filter.matches(&event("u1", "login", "2024-01-01T10:00:00Z")));
        assert!(filter.matches(&event("u1", "purchase", "2024-01-01T10:00:00Z")));
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let filter = EventFilter {
            start_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
            ..Default::default()
        };

        assert!(filter.matches(&event("u1", "login", "2024-01-01T10:00:00Z")));
        assert!(filter.matches(&event("u1", "login", "2024-01-01T12:00:00Z")));
        assert!(!filter.matches(&event("u1", "login", "2024-01-01T09:59:59Z")));
        assert!(!filter.matches(&event("u1", "login", "2024-01-01T12:00:01Z")));
    }

    #[test]
    fn test_severity_matches_metadata() {
        let mut with_severity = event("u1", "error", "2024-01-01T10:00:00Z");
        with_severity
            .metadata
            .insert("severity".to_string(), json!("high"));

        let filter = EventFilter {
            severity: Some("high".to_string()),
            ..Default::default()
        };

        assert!(filter.matches(&with_severity));
        assert!(!filter.matches(&event("u1", "error", "2024-01-01T10:00:00Z")));
    }
}
