//! Progress event union and wire framing.
//!
//! Events are delivered strictly in emission order. `Progress` frames are
//! transient -- a slow consumer may drop or coalesce them with no
//! correctness loss beyond display. `Result` and `Error` are terminal,
//! exactly one per run, mutually exclusive.

use panora_core::image::ImageRef;
use panora_core::run::RunMetadata;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ProgressEvent
// ---------------------------------------------------------------------------

/// One delta of the ordered progress stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Transient status update.
    Progress {
        /// Completion estimate, `0..=100`. Not guaranteed monotonic: a
        /// full retry legitimately restarts at a lower value.
        percent: u8,
        message: String,
        /// Structured stage metadata for clients that render previews.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<ProgressDetail>,
    },

    /// Terminal success. Exactly one per run.
    Result {
        image: ImageRef,
        /// The room description the panorama was rendered from.
        prompt: String,
        title: String,
        metadata: RunMetadata,
    },

    /// Terminal failure. Exactly one per run, mutually exclusive with
    /// `Result`.
    Error { message: String, code: ErrorCode },
}

impl ProgressEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }

    /// Whether a slow consumer may drop this event.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Progress { .. })
    }
}

/// Structured, language-neutral metadata attached to a progress update.
///
/// Rendering is entirely a client concern; the server never ships UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressDetail {
    /// The segmentation stage produced an annotated preview.
    SegmentationPreview { image: ImageRef },
}

/// Terminal error codes surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// All generation attempts were exhausted.
    #[serde(rename = "GENERATION_FAILED")]
    GenerationFailed,
}

// ---------------------------------------------------------------------------
// WireFrame
// ---------------------------------------------------------------------------

/// One JSON chunk as delivered to the caller:
/// `{"type": ..., "data": ..., "transient": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFrame {
    #[serde(flatten)]
    pub event: ProgressEvent,
    /// `true` only for progress frames; terminal frames must never be
    /// dropped in transit.
    pub transient: bool,
}

impl From<ProgressEvent> for WireFrame {
    fn from(event: ProgressEvent) -> Self {
        let transient = event.is_transient();
        Self { event, transient }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_frame_is_transient() {
        let frame = WireFrame::from(ProgressEvent::Progress {
            percent: 25,
            message: "Generating panoramic image...".into(),
            detail: None,
        });
        assert!(frame.transient);

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["data"]["percent"], 25);
        assert_eq!(json["transient"], true);
        // No detail key when absent.
        assert!(json["data"].get("detail").is_none());
    }

    #[test]
    fn result_frame_is_not_transient() {
        let frame = WireFrame::from(ProgressEvent::Result {
            image: ImageRef::new("https://cdn/x.png"),
            prompt: "a cozy reading nook".into(),
            title: "Reading nook".into(),
            metadata: RunMetadata::default(),
        });
        assert!(!frame.transient);

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "result");
        assert_eq!(json["data"]["image"], "https://cdn/x.png");
        assert_eq!(json["transient"], false);
    }

    #[test]
    fn error_code_serializes_as_screaming_snake() {
        let frame = WireFrame::from(ProgressEvent::Error {
            message: "Scene generation failed".into(),
            code: ErrorCode::GenerationFailed,
        });
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["data"]["code"], "GENERATION_FAILED");
    }

    #[test]
    fn detail_carries_structured_kind() {
        let event = ProgressEvent::Progress {
            percent: 45,
            message: "Detecting objects in the scene...".into(),
            detail: Some(ProgressDetail::SegmentationPreview {
                image: ImageRef::new("https://cdn/preview.png"),
            }),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["detail"]["kind"], "segmentation_preview");
    }

    #[test]
    fn wire_frame_round_trips() {
        let frame = WireFrame::from(ProgressEvent::Progress {
            percent: 10,
            message: "Getting things ready...".into(),
            detail: None,
        });
        let json = serde_json::to_string(&frame).unwrap();
        let back: WireFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event, frame.event);
        assert!(back.transient);
    }

    #[test]
    fn terminal_flags_match_variants() {
        let progress = ProgressEvent::Progress {
            percent: 0,
            message: String::new(),
            detail: None,
        };
        let error = ProgressEvent::Error {
            message: String::new(),
            code: ErrorCode::GenerationFailed,
        };
        assert!(!progress.is_terminal());
        assert!(error.is_terminal());
    }
}
