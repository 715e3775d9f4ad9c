//! HTTP surface for the pulse engine
//!
//! JSON request/response bodies, bearer-token auth on the read endpoints,
//! and structured `{"error": {...}}` failures. The router is built from an
//! [`AppState`] so integration tests can drive it without a socket.

pub mod auth;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use pulse_config::PulseConfig;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let timeout = TimeoutLayer::new(Duration::from_secs(state.request_timeout_secs));

    Router::new()
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/verify", get(routes::auth::verify))
        .route("/events", post(routes::events::ingest).get(routes::events::list))
        .route("/events/stats", get(routes::events::stats))
        .route(
            "/events/:id",
            get(routes::events::get_by_id)
                .patch(routes::events::patch)
                .delete(routes::events::delete),
        )
        .route(
            "/notify",
            post(routes::notify::publish).get(routes::notify::channels),
        )
        .route("/health", get(routes::health::health))
        .layer(axum::middleware::from_fn(middleware::logging::logging_middleware))
        .layer(axum::middleware::from_fn(middleware::logging::request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(timeout)
        .with_state(state)
}

/// Run the HTTP server until the process is stopped.
pub async fn serve(config: PulseConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.service.host, config.service.port);
    let state = AppState::from_config(&config);
    let router = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, service = %config.service.name, "pulse listening");
    axum::serve(listener, router).await?;
    Ok(())
}
