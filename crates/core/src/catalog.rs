//! Catalog product model.

use serde::{Deserialize, Serialize};

use crate::image::ImageRef;

/// One catalog product, as stored in the vector index payload.
///
/// Identity is `id`; any result set handed to the pipeline is already
/// deduplicated by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub image_url: ImageRef,
    pub category: String,
}
