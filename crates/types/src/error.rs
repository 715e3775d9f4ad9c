//! Error taxonomy for pulse
//!
//! One enum covers every failure class the engine can surface. Each variant
//! maps to a stable machine-readable kind so the HTTP layer can emit
//! structured errors without leaking internals.

use thiserror::Error;

/// Result type alias for pulse operations
pub type Result<T> = std::result::Result<T, PulseError>;

/// Main error type for the pulse engine
#[derive(Error, Debug)]
pub enum PulseError {
    /// Malformed or missing event fields. Carries every violated rule,
    /// never just the first.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Missing, invalid, or expired credential
    #[error("authentication error: {0}")]
    Auth(String),

    /// Lookup by identifier with no match
    #[error("not found: {0}")]
    NotFound(String),

    /// Underlying store unavailable. Retryable.
    #[error("transient store error: {0}")]
    TransientStore(String),

    /// Fan-out delivery failed. Logged and swallowed by callers, never
    /// propagated out of an otherwise-successful operation.
    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error for unexpected conditions
    #[error("internal error: {0}")]
    Internal(String),
}

impl PulseError {
    /// Stable machine-readable kind for API responses
    pub fn kind(&self) -> &'static str {
        match self {
            PulseError::Validation(_) => "validation_error",
            PulseError::Auth(_) => "auth_error",
            PulseError::NotFound(_) => "not_found",
            PulseError::TransientStore(_) => "transient_store_error",
            PulseError::NotificationDelivery(_) => "notification_delivery_failure",
            PulseError::Config(_) => "config_error",
            PulseError::Serialization(_) => "serialization_error",
            PulseError::Internal(_) => "internal_error",
        }
    }

    /// Whether retrying the operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, PulseError::TransientStore(_))
    }
}
