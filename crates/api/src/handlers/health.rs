//! Liveness and service-status endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// GET /health
///
/// Reports liveness plus which optional collaborators this deployment has
/// configured. Furniture matching availability is decided once at startup.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "gateway_url": state.config.gateway.base_url,
        "furniture_matching": state.orchestrator.furniture_available(),
    }))
}
