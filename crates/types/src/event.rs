//! Event model and ingestion-boundary validation
//!
//! Events arrive as loosely-shaped JSON and are only admitted through
//! [`NewEvent::from_value`], which checks every field rule and reports all
//! violations at once. A [`StoredEvent`] is a validated event plus the
//! server-assigned identity and ingestion time; it is immutable in the hot
//! path (the administrative patch path is the one exception).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::PulseError;

/// Recommended event types. The `type` field is open-ended; these are the
/// classifications the dashboard knows how to break down.
pub mod event_types {
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const PURCHASE: &str = "purchase";
    pub const PAGE_VIEW: &str = "page_view";
    pub const SIGNUP: &str = "signup";
    pub const CLICK: &str = "click";
    pub const FORM_SUBMIT: &str = "form_submit";
    pub const ERROR: &str = "error";
}

/// A validated event payload, not yet stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    /// Actor identifier. Always non-empty.
    pub user_id: String,
    /// Open-ended classification (see [`event_types`]).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Monetary or magnitude amount; semantics depend on `event_type`.
    #[serde(default)]
    pub value: f64,
    /// When the event occurred (caller-supplied, distinct from ingestion time).
    pub timestamp: DateTime<Utc>,
    /// Open mapping of extra attributes.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl NewEvent {
    /// Validate a raw JSON payload into a `NewEvent`.
    ///
    /// Collects **every** violated rule rather than failing on the first:
    /// `userId` and `type` must be non-empty strings, `timestamp` must parse
    /// as an RFC 3339 instant, `value` (if present) must be numeric, and
    /// `metadata` (if present) must be an object. `value` defaults to 0 and
    /// `metadata` to an empty mapping.
    pub fn from_value(raw: &Value) -> Result<Self, PulseError> {
        let mut violations = Vec::new();

        let user_id = match raw.get("userId") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => {
                violations.push("userId is required and must be a non-empty string".to_string());
                None
            }
        };

        let event_type = match raw.get("type") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => {
                violations.push("type is required and must be a non-empty string".to_string());
                None
            }
        };

        let timestamp = match raw.get("timestamp") {
            None | Some(Value::Null) => {
                violations.push("timestamp is required".to_string());
                None
            }
            Some(Value::String(s)) => match DateTime::parse_from_rfc3339(s) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(_) => {
                    violations.push("timestamp must be a valid date".to_string());
                    None
                }
            },
            Some(_) => {
                violations.push("timestamp must be a valid date".to_string());
                None
            }
        };

        let value = match raw.get("value") {
            None | Some(Value::Null) => 0.0,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(_) => {
                violations.push("value must be a number".to_string());
                0.0
            }
        };

        let metadata = match raw.get("metadata") {
            None | Some(Value::Null) => HashMap::new(),
            Some(Value::Object(map)) => map.clone().into_iter().collect(),
            Some(_) => {
                violations.push("metadata must be an object".to_string());
                HashMap::new()
            }
        };

        if !violations.is_empty() {
            return Err(PulseError::Validation(violations));
        }

        Ok(NewEvent {
            // Both unwraps guarded by the violations check above.
            user_id: user_id.unwrap(),
            event_type: event_type.unwrap(),
            value,
            timestamp: timestamp.unwrap(),
            metadata,
        })
    }
}

/// An event as persisted in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    /// Opaque unique identifier, assigned at ingestion.
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub metadata: HashMap<String, Value>,
    /// Ingestion time, server-assigned.
    pub created_at: DateTime<Utc>,
    /// Set only by the administrative correction path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredEvent {
    /// Materialize a validated payload with server-assigned identity.
    pub fn from_new(event: NewEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: event.user_id,
            event_type: event.event_type,
            value: event.value,
            timestamp: event.timestamp,
            metadata: event.metadata,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

/// Partial update for administrative correction. Absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub value: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub metadata: Option<HashMap<String, Value>>,
}

impl EventPatch {
    /// True when the patch carries no changes.
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.event_type.is_none()
            && self.value.is_none()
            && self.timestamp.is_none()
            && self.metadata.is_none()
    }

    /// Apply this patch to a stored event, stamping `updated_at`.
    pub fn apply(self, event: &mut StoredEvent) {
        if let Some(user_id) = self.user_id {
            event.user_id = user_id;
        }
        if let Some(event_type) = self.event_type {
            event.event_type = event_type;
        }
        if let Some(value) = self.value {
            event.value = value;
        }
        if let Some(timestamp) = self.timestamp {
            event.timestamp = timestamp;
        }
        if let Some(metadata) = self.metadata {
            event.metadata = metadata;
        }
        event.updated_at = Some(Utc::now());
    }
}
