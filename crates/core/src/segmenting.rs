//! Detected image segments.
//!
//! Segments are produced by the segmentation stage, consumed by the
//! filter/search stages, and discarded with the run. They are never
//! persisted.

use serde::{Deserialize, Serialize};

use crate::image::ImageRef;

/// Axis-aligned bounding box in pixel coordinates, `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundingBox(pub [f64; 4]);

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.0[2] - self.0[0]
    }

    pub fn height(&self) -> f64 {
        self.0[3] - self.0[1]
    }
}

/// One detected region of the panorama, candidate for furniture matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Opaque token identifying this segment within its run.
    pub id: String,
    pub bounding_box: BoundingBox,
    pub label: String,
    /// Region image fed to the embedding stage.
    pub cropped_image: ImageRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_dimensions() {
        let bbox = BoundingBox([10.0, 20.0, 110.0, 70.0]);
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 50.0);
    }

    #[test]
    fn bounding_box_serializes_as_array() {
        let bbox = BoundingBox([1.0, 2.0, 3.0, 4.0]);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");
    }
}
