//! Health check route (root level, not under `/api/v1`).

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}
