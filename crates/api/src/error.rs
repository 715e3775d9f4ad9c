//! API error mapping
//!
//! Every failure leaves the API as a structured body with a stable
//! machine-readable `kind` and a human-readable `message`. Internal detail
//! never leaks: 5xx responses carry a generic message, with the real cause
//! logged server-side.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pulse_types::PulseError;
use serde_json::json;
use tracing::error;

/// Wrapper that turns a [`PulseError`] into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub PulseError);

impl From<PulseError> for ApiError {
    fn from(err: PulseError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            PulseError::Validation(_) => StatusCode::BAD_REQUEST,
            PulseError::Auth(_) => StatusCode::UNAUTHORIZED,
            PulseError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.0.kind();

        let message = if status.is_server_error() {
            error!(kind, error = %self.0, "request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let mut body = json!({
            "error": {
                "kind": kind,
                "message": message,
            }
        });
        if let PulseError::Validation(violations) = &self.0 {
            body["error"]["details"] = json!(violations);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError(PulseError::Validation(vec![])).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(PulseError::Auth("no token".into())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError(PulseError::NotFound("event".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(PulseError::TransientStore("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
