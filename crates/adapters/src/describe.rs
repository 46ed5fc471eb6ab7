//! Room-description client (text generation).

use panora_core::conversation::ChatMessage;
use serde::Deserialize;

use crate::error::ErrorKind;
use crate::http::{parse_response, HttpFailure};
use crate::prompts;

const TEXT_GENERATE_PATH: &str = "/v1/text/generate";

/// Client for the text-generation capability of the model gateway.
pub struct DescribeClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

/// Response returned by the text-generation endpoint.
#[derive(Debug, Deserialize)]
struct TextResponse {
    text: String,
}

/// Errors from the room-description stage.
#[derive(Debug, thiserror::Error)]
pub enum DescribeError {
    #[error(transparent)]
    Http(#[from] HttpFailure),

    /// The gateway answered but the generated description was empty.
    #[error("generated room description is empty")]
    Empty,
}

impl DescribeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(inner) => inner.kind(),
            Self::Empty => ErrorKind::InvalidResponse,
        }
    }
}

impl DescribeClient {
    /// Create a new client targeting the model gateway.
    pub fn new(base_url: String, api_token: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_token)
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (connection pooling across adapters).
    pub fn with_client(client: reqwest::Client, base_url: String, api_token: String) -> Self {
        Self {
            client,
            base_url,
            api_token,
        }
    }

    /// Generate a detailed room description from the conversation history.
    ///
    /// The full description is what the panorama stage renders; an empty
    /// result is rejected here rather than propagated as a blank prompt.
    pub async fn describe_room(&self, messages: &[ChatMessage]) -> Result<String, DescribeError> {
        let body = serde_json::json!({
            "system": prompts::ROOM_DESCRIPTION_SYSTEM,
            "messages": messages,
        });

        let response = self
            .client
            .post(format!("{}{TEXT_GENERATE_PATH}", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(HttpFailure::from)?;

        let parsed: TextResponse = parse_response(response).await?;
        let text = parsed.text.trim().to_string();
        if text.is_empty() {
            return Err(DescribeError::Empty);
        }

        tracing::debug!(chars = text.len(), "Generated room description");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_description_classifies_as_invalid_response() {
        assert_eq!(DescribeError::Empty.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn service_error_classifies_as_service() {
        let err = DescribeError::Http(HttpFailure::Api {
            status: 502,
            body: "bad gateway".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Service);
    }
}
