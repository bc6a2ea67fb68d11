//! Administrative endpoints.

use axum::{extract::State, routing::post, Json, Router};

use crate::error::AppError;
use crate::json::ReconcileResponse;
use crate::AppState;

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reconcile", post(reconcile))
}

/// Run the enrollment repair pass and report what it changed.
async fn reconcile(State(state): State<AppState>) -> Result<Json<ReconcileResponse>, AppError> {
    let report = state.registrar.reconcile()?;
    Ok(Json(ReconcileResponse {
        message: "reconcile pass complete".to_string(),
        report,
    }))
}
