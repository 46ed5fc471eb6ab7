//! Route definitions.

pub mod health;
pub mod products;
pub mod scene;

use axum::Router;

use crate::state::AppState;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/scenes", scene::router())
        .nest("/products", products::router())
}
