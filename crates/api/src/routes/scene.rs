//! Scene generation routes.
//!
//! ```text
//! POST /{id}/generate    generate_scene (SSE progress stream)
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::scene;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/generate", post(scene::generate_scene))
}
