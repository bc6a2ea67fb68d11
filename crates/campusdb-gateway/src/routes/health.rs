//! Health check endpoint.

use axum::{extract::State, routing::get, Json, Router};

use crate::json::HealthResponse;
use crate::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    match state.registrar.counts() {
        Ok((students, courses)) => Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            students,
            courses,
        }),
        Err(_) => Json(HealthResponse {
            status: "degraded".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            students: 0,
            courses: 0,
        }),
    }
}
