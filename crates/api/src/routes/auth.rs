//! Login and token verification

use axum::extract::State;
use axum::Json;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse, VerifyResponse};
use crate::state::AppState;

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, user) = state.auth.login(&request.email, &request.password)?;
    Ok(Json(LoginResponse {
        success: true,
        token,
        user,
    }))
}

/// `GET /auth/verify`
pub async fn verify(AuthUser(user): AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse { valid: true, user })
}
