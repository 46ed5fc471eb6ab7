//! Embedding client (text terms and segment crops).

use panora_core::segmenting::Segment;
use serde::Deserialize;

use crate::error::ErrorKind;
use crate::http::{parse_response, HttpFailure};

const TEXT_EMBED_PATH: &str = "/v1/embeddings/text";
const IMAGE_EMBED_PATH: &str = "/v1/embeddings/image";

/// Client for the embedding capabilities of the model gateway.
pub struct EmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct BatchEmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct SingleEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Errors from the embedding stage.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error(transparent)]
    Http(#[from] HttpFailure),

    /// The gateway returned a different number of vectors than inputs.
    #[error("expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

impl EmbedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(inner) => inner.kind(),
            Self::CountMismatch { .. } => ErrorKind::InvalidResponse,
        }
    }
}

impl EmbeddingClient {
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

    /// Embed a batch of text terms in a single call.
    ///
    /// The result is index-aligned with the input; a count mismatch is
    /// rejected rather than silently mispaired.
    pub async fn embed_terms(&self, terms: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let body = serde_json::json!({ "inputs": terms });

        let response = self
            .client
            .post(format!("{}{TEXT_EMBED_PATH}", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(HttpFailure::from)?;

        let parsed: BatchEmbeddingResponse = parse_response(response).await?;
        if parsed.embeddings.len() != terms.len() {
            return Err(EmbedError::CountMismatch {
                expected: terms.len(),
                actual: parsed.embeddings.len(),
            });
        }
        Ok(parsed.embeddings)
    }

    /// Embed one segment: its cropped region plus the detection label.
    pub async fn embed_segment(&self, segment: &Segment) -> Result<Vec<f32>, EmbedError> {
        let body = serde_json::json!({
            "image_url": segment.cropped_image.as_str(),
            "bounding_box": segment.bounding_box,
            "label": segment.label,
        });

        let response = self
            .client
            .post(format!("{}{IMAGE_EMBED_PATH}", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(HttpFailure::from)?;

        let parsed: SingleEmbeddingResponse = parse_response(response).await?;
        Ok(parsed.embedding)
    }
}
