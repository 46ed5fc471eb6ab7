//! Panorama generation client (image generation).

use panora_core::config::GenerationConfig;
use panora_core::image::{ImageRef, PanoramaImage};
use serde::Deserialize;

use crate::error::ErrorKind;
use crate::http::{parse_response, HttpFailure};
use crate::prompts;

const PANORAMA_PATH: &str = "/v1/images/panorama";

/// Client for the panorama-generation capability of the model gateway.
pub struct PanoramaClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

/// Response returned by the panorama endpoint.
///
/// `image_url` is the durable object-storage location; `working_url` is the
/// ephemeral model-output URL, only valid for the rest of the run.
#[derive(Debug, Deserialize)]
struct PanoramaResponse {
    image_url: String,
    working_url: Option<String>,
}

/// Errors from the panorama stage.
#[derive(Debug, thiserror::Error)]
pub enum PanoramaError {
    #[error(transparent)]
    Http(#[from] HttpFailure),

    /// The gateway answered 2xx without a usable image location.
    #[error("gateway returned no image output")]
    MissingOutput,
}

impl PanoramaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(inner) => inner.kind(),
            Self::MissingOutput => ErrorKind::InvalidResponse,
        }
    }
}

impl PanoramaClient {
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

    /// Render a 360° equirectangular panorama from a room description.
    ///
    /// Image parameters come pre-clamped from [`GenerationConfig`]; this
    /// adapter does not re-validate them.
    pub async fn generate(
        &self,
        description: &str,
        config: &GenerationConfig,
    ) -> Result<PanoramaImage, PanoramaError> {
        let body = serde_json::json!({
            "prompt": prompts::panorama_prompt(description),
            "width": config.image_width,
            "height": config.image_height,
            "guidance_scale": config.guidance_scale,
            "inference_steps": config.inference_steps,
            "output_format": "png",
        });

        let response = self
            .client
            .post(format!("{}{PANORAMA_PATH}", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(HttpFailure::from)?;

        let parsed: PanoramaResponse = parse_response(response).await?;
        if parsed.image_url.is_empty() {
            return Err(PanoramaError::MissingOutput);
        }

        tracing::info!(
            width = config.image_width,
            height = config.image_height,
            "Generated panorama",
        );

        // A missing working URL degrades to the durable one; segmentation
        // only needs something fetchable within this run.
        let working = parsed
            .working_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| parsed.image_url.clone());

        Ok(PanoramaImage {
            durable: ImageRef::new(parsed.image_url),
            working: ImageRef::new(working),
        })
    }
}
