//! Catalog product routes.
//!
//! ```text
//! POST /search    search_products
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::products;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/search", post(products::search_products))
}
