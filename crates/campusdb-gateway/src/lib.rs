//! campusdb HTTP/JSON gateway.
//!
//! Thin axum layer over [`campusdb_core::Registrar`]: routes translate HTTP
//! requests into registrar calls and map core errors to status codes.

pub mod config;
pub mod error;
pub mod json;
pub mod routes;

pub use config::{Args, GatewayConfig};
pub use error::AppError;

use axum::Router;
use campusdb_core::Registrar;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Operation surface over the entity store.
    pub registrar: Registrar,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new application state.
    pub fn new(registrar: Registrar, config: GatewayConfig) -> Self {
        Self { registrar, config }
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::students::routes())
        .merge(routes::courses::routes())
        .merge(routes::admin::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
