//! Request/response models

use pulse_types::{EventFilter, PulseError, StoredEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authenticated subject
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

/// Token verification response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: UserInfo,
}

/// Query parameters for `GET /events`
///
/// Date bounds and the limit arrive as strings so that unparseable values
/// are rejected with the structured validation error, never silently
/// ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    /// Event type to match; `all` disables the type filter
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub user_id: Option<String>,
    pub severity: Option<String>,
    /// Inclusive RFC 3339 lower bound on `timestamp`
    pub start_date: Option<String>,
    /// Inclusive RFC 3339 upper bound on `timestamp`
    pub end_date: Option<String>,
    /// Maximum events to return (default 100)
    pub limit: Option<String>,
}

impl EventsQuery {
    /// Parse into a store filter, collecting every invalid parameter.
    pub fn into_filter(self) -> Result<EventFilter, PulseError> {
        let mut violations = Vec::new();

        let start_date = match self.start_date.as_deref() {
            None => None,
            Some(raw) => match raw.parse() {
                Ok(ts) => Some(ts),
                Err(_) => {
                    violations.push("startDate must be a valid date".to_string());
                    None
                }
            },
        };

        let end_date = match self.end_date.as_deref() {
            None => None,
            Some(raw) => match raw.parse() {
                Ok(ts) => Some(ts),
                Err(_) => {
                    violations.push("endDate must be a valid date".to_string());
                    None
                }
            },
        };

        let limit = match self.limit.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<usize>() {
                Ok(limit) => Some(limit),
                Err(_) => {
                    violations.push("limit must be a non-negative integer".to_string());
                    None
                }
            },
        };

        if !violations.is_empty() {
            return Err(PulseError::Validation(violations));
        }

        Ok(EventFilter {
            event_type: self.event_type,
            user_id: self.user_id,
            severity: self.severity,
            start_date,
            end_date,
            limit,
        })
    }
}

/// Response for `GET /events`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventsResponse {
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<StoredEvent>,
    /// Number of events returned (post-limit)
    pub total: usize,
}

/// Response for `POST /events`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub event_id: uuid::Uuid,
}

/// Query parameters for `GET /events/stats`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct StatsQuery {
    /// Trailing window in hours (default 24)
    pub hours: Option<String>,
}

impl StatsQuery {
    /// Parse the window, defaulting to 24 hours.
    pub fn window_hours(&self) -> Result<i64, PulseError> {
        match self.hours.as_deref() {
            None => Ok(24),
            Some(raw) => raw.parse::<i64>().ok().filter(|h| *h > 0).ok_or_else(|| {
                PulseError::Validation(vec!["hours must be a positive integer".to_string()])
            }),
        }
    }
}

/// Response for `DELETE /events/:id`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Request for `POST /notify`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotifyRequest {
    /// Target channel
    pub channel: String,
    /// Signal name; defaults to a generic data-changed notification
    pub signal: Option<String>,
    /// Arbitrary JSON payload
    #[serde(default)]
    #[schema(value_type = Object)]
    pub payload: Value,
}

/// Response for `POST /notify`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotifyResponse {
    /// Subscribers the signal was handed to
    pub delivered: usize,
}

/// One channel's subscriber count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelInfo {
    pub channel: String,
    pub subscribers: usize,
}

/// Response for `GET /notify`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelsResponse {
    pub channels: Vec<ChannelInfo>,
}

/// Response for `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
    pub events_stored: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_query_collects_every_bad_parameter() {
        let query = EventsQuery {
            start_date: Some("not-a-date".to_string()),
            end_date: Some("also-bad".to_string()),
            limit: Some("many".to_string()),
            ..Default::default()
        };

        match query.into_filter() {
            Err(PulseError::Validation(violations)) => assert_eq!(violations.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_events_query_parses_bounds_and_limit() {
        let query = EventsQuery {
            event_type: Some("purchase".to_string()),
            start_date: Some("2024-01-01T00:00:00Z".to_string()),
            limit: Some("10".to_string()),
            ..Default::default()
        };

        let filter = query.into_filter().unwrap();
        assert_eq!(filter.event_type.as_deref(), Some("purchase"));
        assert!(filter.start_date.is_some());
        assert_eq!(filter.limit, Some(10));
    }

    #[test]
    fn test_stats_query_defaults_to_24_hours() {
        assert_eq!(StatsQuery::default().window_hours().unwrap(), 24);
        assert_eq!(
            StatsQuery { hours: Some("6".to_string()) }.window_hours().unwrap(),
            6
        );
        assert!(StatsQuery { hours: Some("zero".to_string()) }
            .window_hours()
            .is_err());
        assert!(StatsQuery { hours: Some("-4".to_string()) }
            .window_hours()
            .is_err());
    }
}
