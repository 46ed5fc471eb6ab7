//! Catalog product search endpoint.
//!
//! Thin HTTP surface over the vector search client, used by the furniture
//! browser. Search never errors: a degraded index shows up as an empty
//! product list, exactly as it does inside the pipeline.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /products/search`.
#[derive(Debug, Deserialize)]
pub struct SearchProductsRequest {
    /// Raw furniture terms; normalization happens server-side.
    pub terms: Vec<String>,
}

/// POST /api/v1/products/search
///
/// Returns at most five deduplicated catalog products for the given terms.
/// Responds 503 when this deployment has no vector index configured.
pub async fn search_products(
    State(state): State<AppState>,
    Json(request): Json<SearchProductsRequest>,
) -> AppResult<impl IntoResponse> {
    let Some(search) = &state.product_search else {
        return Err(AppError::ServiceUnavailable(
            "furniture matching is not configured".to_string(),
        ));
    };

    let products = search.search(&request.terms).await;
    Ok(Json(json!({ "products": products })))
}
