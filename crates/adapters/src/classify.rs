//! Segment classification client.
//!
//! Given the panorama and the full list of detected labels, the classifier
//! returns the subset of segment ids that are catalogable furniture. The
//! model is asked for a bare JSON array but tends to wrap it in prose, so
//! [`parse_id_array`] extracts the first bracketed span before decoding.

use panora_core::image::ImageRef;
use panora_core::segmenting::Segment;
use serde::Deserialize;

use crate::error::ErrorKind;
use crate::http::{parse_response, HttpFailure};
use crate::prompts;

const CLASSIFY_PATH: &str = "/v1/images/classify";

/// Client for the segment-classification capability of the model gateway.
pub struct ClassifierClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

/// Response returned by the classification endpoint.
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    text: String,
}

/// Errors from the classification stage.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Http(#[from] HttpFailure),

    /// No JSON id array could be recovered from the model output.
    #[error("malformed classification output: {0}")]
    Malformed(String),
}

impl ClassifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(inner) => inner.kind(),
            Self::Malformed(_) => ErrorKind::InvalidResponse,
        }
    }
}

impl ClassifierClient {
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

    /// Select the segment ids worth matching against the catalog.
    ///
    /// Ids the model invents are dropped; an empty result is a valid
    /// outcome (e.g. the detector only found walls and windows).
    pub async fn filter_catalogable(
        &self,
        segments: &[Segment],
        image: &ImageRef,
    ) -> Result<Vec<String>, ClassifyError> {
        let items: Vec<serde_json::Value> = segments
            .iter()
            .map(|s| serde_json::json!({ "id": s.id, "label": s.label }))
            .collect();

        let body = serde_json::json!({
            "image_url": image.as_str(),
            "items": items,
            "instruction": prompts::CATALOGABLE_INSTRUCTION,
        });

        let response = self
            .client
            .post(format!("{}{CLASSIFY_PATH}", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(HttpFailure::from)?;

        let parsed: ClassifyResponse = parse_response(response).await?;
        let ids = parse_id_array(&parsed.text)?;

        // Keep only ids that actually name a segment from this run.
        let selected: Vec<String> = ids
            .into_iter()
            .filter(|id| segments.iter().any(|s| &s.id == id))
            .collect();

        tracing::debug!(
            total = segments.len(),
            selected = selected.len(),
            "Filtered segments to catalogable furniture",
        );
        Ok(selected)
    }
}

/// Decode a JSON string array, tolerating surrounding prose.
///
/// Tries the text verbatim first, then the span between the first `[` and
/// the last `]`.
pub fn parse_id_array(text: &str) -> Result<Vec<String>, ClassifyError> {
    if let Ok(ids) = serde_json::from_str::<Vec<String>>(text.trim()) {
        return Ok(ids);
    }

    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            if let Ok(ids) = serde_json::from_str::<Vec<String>>(&text[start..=end]) {
                return Ok(ids);
            }
        }
    }

    Err(ClassifyError::Malformed(format!(
        "expected a JSON array of ids, got: {}",
        text.chars().take(120).collect::<String>()
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        let ids = parse_id_array(r#"["seg-0", "seg-2"]"#).unwrap();
        assert_eq!(ids, vec!["seg-0", "seg-2"]);
    }

    #[test]
    fn parses_array_wrapped_in_prose() {
        let ids =
            parse_id_array(r#"The catalogable items are: ["seg-1"] as requested."#).unwrap();
        assert_eq!(ids, vec!["seg-1"]);
    }

    #[test]
    fn parses_empty_array() {
        let ids = parse_id_array("[]").unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn rejects_text_without_array() {
        let err = parse_id_array("none of these are furniture").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn rejects_non_string_array() {
        assert!(parse_id_array("[1, 2, 3]").is_err());
    }
}
