//! Image reference types.
//!
//! An [`ImageRef`] is a fetchable location, not pixel data. The pipeline
//! distinguishes the durable reference (object-storage backed, safe to hand
//! to the caller) from the working reference (an ephemeral model-output URL
//! that only lives long enough to feed the segmentation stage).

use serde::{Deserialize, Serialize};

/// A fetchable image location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of the panorama stage.
///
/// `durable` must stay independently fetchable for the lifetime of the
/// result; `working` is only valid within the current run and is consumed
/// by segmentation.
#[derive(Debug, Clone)]
pub struct PanoramaImage {
    pub durable: ImageRef,
    pub working: ImageRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_string() {
        let image = ImageRef::new("https://cdn.example.com/panoramas/a.png");
        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(json, "\"https://cdn.example.com/panoramas/a.png\"");
    }

    #[test]
    fn deserializes_from_bare_string() {
        let image: ImageRef = serde_json::from_str("\"https://x/y.png\"").unwrap();
        assert_eq!(image.as_str(), "https://x/y.png");
    }
}
