//! Upscaling client.

use panora_core::image::ImageRef;
use serde::Deserialize;

use crate::error::ErrorKind;
use crate::http::{parse_response, HttpFailure};
use crate::prompts;

const UPSCALE_PATH: &str = "/v1/images/upscale";

/// Upscaler tuning. Fixed values carried over from the production model
/// configuration; not user-adjustable.
const SCALE_FACTOR: u32 = 2;
const CREATIVITY: f64 = 0.35;
const RESEMBLANCE: f64 = 0.6;

/// Client for the upscaling capability of the model gateway.
pub struct UpscaleClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct UpscaleResponse {
    image_url: String,
}

/// Errors from the upscaling stage.
#[derive(Debug, thiserror::Error)]
pub enum UpscaleError {
    #[error(transparent)]
    Http(#[from] HttpFailure),

    #[error("gateway returned no upscaled image")]
    MissingOutput,
}

impl UpscaleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(inner) => inner.kind(),
            Self::MissingOutput => ErrorKind::InvalidResponse,
        }
    }
}

impl UpscaleClient {
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

    /// Upscale the current best image 2x.
    pub async fn upscale(&self, image: &ImageRef) -> Result<ImageRef, UpscaleError> {
        let body = serde_json::json!({
            "image_url": image.as_str(),
            "prompt": prompts::UPSCALE_PROMPT,
            "negative_prompt": prompts::UPSCALE_NEGATIVE_PROMPT,
            "scale_factor": SCALE_FACTOR,
            "creativity": CREATIVITY,
            "resemblance": RESEMBLANCE,
        });

        let response = self
            .client
            .post(format!("{}{UPSCALE_PATH}", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(HttpFailure::from)?;

        let parsed: UpscaleResponse = parse_response(response).await?;
        if parsed.image_url.is_empty() {
            return Err(UpscaleError::MissingOutput);
        }

        tracing::info!("Upscaled image");
        Ok(ImageRef::new(parsed.image_url))
    }
}
