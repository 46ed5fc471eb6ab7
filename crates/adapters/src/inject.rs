//! Product-injection client (image editing).

use panora_core::catalog::Product;
use panora_core::image::ImageRef;
use serde::Deserialize;

use crate::error::ErrorKind;
use crate::http::{parse_response, HttpFailure};
use crate::prompts;

const INJECT_PATH: &str = "/v1/images/inject";

/// Client for the image-editing capability of the model gateway.
pub struct InjectionClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct InjectResponse {
    image_url: String,
}

/// Errors from the injection stage.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error(transparent)]
    Http(#[from] HttpFailure),

    #[error("gateway returned no edited image")]
    MissingOutput,
}

impl InjectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(inner) => inner.kind(),
            Self::MissingOutput => ErrorKind::InvalidResponse,
        }
    }
}

impl InjectionClient {
    pub fn new(base_url: String, api_token: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_token)
    }

    pub fn with_client(client: reqwest::Client, base_url: String, api_token: String) -> Self {
        Self {
            client,
            base_url,
            api_token,
        }
    }

    /// Render the matched products into the panorama.
    ///
    /// Product images are passed in match order; the gateway composes them
    /// into the scene and uploads a new durable image.
    pub async fn inject_products(
        &self,
        image: &ImageRef,
        products: &[Product],
    ) -> Result<ImageRef, InjectError> {
        let product_images: Vec<&str> = products
            .iter()
            .map(|p| p.image_url.as_str())
            .collect();

        let body = serde_json::json!({
            "image_url": image.as_str(),
            "product_image_urls": product_images,
            "prompt": prompts::INJECTION_PROMPT,
            "output_format": "jpg",
        });

        let response = self
            .client
            .post(format!("{}{INJECT_PATH}", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(HttpFailure::from)?;

        let parsed: InjectResponse = parse_response(response).await?;
        if parsed.image_url.is_empty() {
            return Err(InjectError::MissingOutput);
        }

        tracing::info!(products = products.len(), "Injected products into panorama");
        Ok(ImageRef::new(parsed.image_url))
    }
}
