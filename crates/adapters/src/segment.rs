//! Object-detection client (image segmentation).
//!
//! The detection model reports its result as pseudo-JSON inside a `text`
//! field: single-quoted, with the detections under an `"<OD>"` key holding
//! parallel `bboxes`/`labels` arrays. [`parse_detection`] normalizes the
//! quoting and pairs the arrays up.

use panora_core::image::ImageRef;
use panora_core::segmenting::BoundingBox;
use serde::Deserialize;

use crate::error::ErrorKind;
use crate::http::{parse_response, HttpFailure};

const SEGMENT_PATH: &str = "/v1/images/segment";

/// Client for the object-detection capability of the model gateway.
pub struct SegmentationClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

/// One detected region: bounding box plus model label.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub bounding_box: BoundingBox,
    pub label: String,
}

/// Response returned by the segmentation endpoint.
#[derive(Debug, Deserialize)]
struct SegmentResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawDetection {
    #[serde(rename = "<OD>")]
    od: RawObjectDetection,
}

#[derive(Debug, Deserialize)]
struct RawObjectDetection {
    bboxes: Vec<[f64; 4]>,
    labels: Vec<String>,
}

/// Errors from the segmentation stage.
#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    #[error(transparent)]
    Http(#[from] HttpFailure),

    /// The detection text could not be parsed into boxes and labels.
    #[error("malformed detection payload: {0}")]
    Malformed(String),
}

impl SegmentationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(inner) => inner.kind(),
            Self::Malformed(_) => ErrorKind::InvalidResponse,
        }
    }
}

impl SegmentationClient {
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

    /// Detect objects in the panorama.
    ///
    /// Zero detections is a normal outcome (an empty room), not an error.
    pub async fn segment(&self, image: &ImageRef) -> Result<Vec<DetectedObject>, SegmentationError> {
        let body = serde_json::json!({
            "image_url": image.as_str(),
            "task": "object-detection",
        });

        let response = self
            .client
            .post(format!("{}{SEGMENT_PATH}", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(HttpFailure::from)?;

        let parsed: SegmentResponse = parse_response(response).await?;
        let objects = parse_detection(&parsed.text)?;

        tracing::debug!(count = objects.len(), "Detected objects in panorama");
        Ok(objects)
    }
}

/// Parse the model's pseudo-JSON detection text.
///
/// The model single-quotes its output, so quotes are normalized before
/// decoding. Parallel arrays of unequal length are paired up to the
/// shorter one.
pub fn parse_detection(text: &str) -> Result<Vec<DetectedObject>, SegmentationError> {
    let normalized = text.replace('\'', "\"");
    let raw: RawDetection = serde_json::from_str(&normalized)
        .map_err(|e| SegmentationError::Malformed(e.to_string()))?;

    Ok(raw
        .od
        .bboxes
        .into_iter()
        .zip(raw.od.labels)
        .map(|(bbox, label)| DetectedObject {
            bounding_box: BoundingBox(bbox),
            label,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
