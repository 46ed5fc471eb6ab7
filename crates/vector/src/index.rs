//! Vector index transport.
//!
//! [`PointSearch`] abstracts the batched nearest-neighbor query so the
//! search algorithm can be exercised without a live index. [`QdrantIndex`]
//! is the production implementation over the Qdrant HTTP API.

use async_trait::async_trait;
use panora_core::catalog::Product;
use panora_core::image::ImageRef;
use serde::{Deserialize, Serialize};

/// One nearest-neighbor query within a batch.
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    pub vector: Vec<f32>,
    pub limit: usize,
    pub score_threshold: f32,
    pub with_payload: bool,
}

/// One scored candidate returned by the index.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredPoint {
    #[serde(default)]
    pub score: f32,
    pub payload: Option<ProductPayload>,
}

/// Raw payload stored alongside each point in the product collection.
///
/// Field names follow the catalog ingestion schema; everything is optional
/// because older points may predate payload fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPayload {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub main_image_url: Option<String>,
    pub category_name: Option<String>,
    /// Concatenated searchable text, used for the lexical fallback.
    pub text: Option<String>,
}

impl ProductPayload {
    /// Convert the payload into a [`Product`], filling gaps with defaults.
    ///
    /// Returns `None` when the payload has no product id -- identity is
    /// non-negotiable.
    pub fn into_product(self) -> Option<Product> {
        let id = self.product_id?;
        Some(Product {
            id,
            name: self
                .product_name
                .unwrap_or_else(|| "Unknown Product".to_string()),
            description: self.description.unwrap_or_default(),
            price: self.price.unwrap_or(0.0),
            currency: self.currency.unwrap_or_else(|| "USD".to_string()),
            image_url: ImageRef::new(self.main_image_url.unwrap_or_default()),
            category: self
                .category_name
                .unwrap_or_else(|| "furniture".to_string()),
        })
    }
}

/// Errors from the vector index transport.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The index returned a non-2xx status code.
    #[error("vector index error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Batched nearest-neighbor search against the product collection.
#[async_trait]
pub trait PointSearch: Send + Sync {
    /// Execute one query per entry of `queries`; the result is
    /// index-aligned with the input.
    async fn search_batch(
        &self,
        queries: &[SearchQuery],
    ) -> Result<Vec<Vec<ScoredPoint>>, IndexError>;
}

// ---------------------------------------------------------------------------
// QdrantIndex
// ---------------------------------------------------------------------------

/// HTTP client for a Qdrant collection.
pub struct QdrantIndex {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    collection: String,
}

#[derive(Debug, Deserialize)]
struct BatchSearchResponse {
    result: Vec<Vec<ScoredPoint>>,
}

impl QdrantIndex {
    /// Create a new index client.
    ///
    /// * `base_url`   - Qdrant HTTP URL, e.g. `https://host:6333`.
    /// * `api_key`    - value for the `api-key` header.
    /// * `collection` - product collection name.
    pub fn new(base_url: String, api_key: String, collection: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key, collection)
    }

    /// Create an index client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        collection: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            collection,
        }
    }
}

#[async_trait]
impl PointSearch for QdrantIndex {
    async fn search_batch(
        &self,
        queries: &[SearchQuery],
    ) -> Result<Vec<Vec<ScoredPoint>>, IndexError> {
        let body = serde_json::json!({ "searches": queries });

        let response = self
            .client
            .post(format!(
                "{}/collections/{}/points/search/batch",
                self.base_url, self.collection
            ))
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(IndexError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: BatchSearchResponse = response.json().await?;
        Ok(parsed.result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
