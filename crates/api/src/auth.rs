//! Bearer-token authentication
//!
//! The identity provider contract is fixed: one admin identity from
//! configuration, HS256 bearer tokens, and "valid subject or rejected" —
//! the engine never manages credentials beyond this.

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use pulse_config::AuthConfig;
use pulse_types::PulseError;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::UserInfo;
use crate::state::AppState;

/// Token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

/// Issues and verifies bearer tokens.
#[derive(Clone)]
pub struct AuthService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
    admin_email: String,
    admin_password: String,
    admin_name: String,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: Duration::hours(config.token_ttl_hours as i64),
            admin_email: config.admin_email.clone(),
            admin_password: config.admin_password.clone(),
            admin_name: config.admin_name.clone(),
        }
    }

    /// Check credentials and issue a token.
    pub fn login(&self, email: &str, password: &str) -> Result<(String, UserInfo), PulseError> {
        if email != self.admin_email || password != self.admin_password {
            return Err(PulseError::Auth("invalid credentials".to_string()));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: "1".to_string(),
            email: self.admin_email.clone(),
            name: self.admin_name.clone(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| PulseError::Internal(format!("token signing failed: {e}")))?;

        Ok((token, self.user_info(&claims)))
    }

    /// Verify a bearer token, returning the subject it identifies.
    pub fn verify(&self, token: &str) -> Result<UserInfo, PulseError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| PulseError::Auth("invalid or expired token".to_string()))?;
        Ok(self.user_info(&data.claims))
    }

    fn user_info(&self, claims: &Claims) -> UserInfo {
        UserInfo {
            id: claims.sub.parse().unwrap_or(1),
            email: claims.email.clone(),
            name: claims.name.clone(),
        }
    }
}

/// Extractor for handlers that require a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserInfo);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| PulseError::Auth("missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| PulseError::Auth("missing bearer token".to_string()))?;

        let user = state.auth.verify(token)?;
        Ok(AuthUser(user))
    }
}
