//! Consumer-side replay of the progress stream.
//!
//! The transport may re-deliver the accumulated stream (network retry),
//! so the fold keys on position, not content: [`SceneView::apply_stream`]
//! only processes events past `last_processed_index`. Applying the same
//! stream twice is a no-op.

use crate::progress::{ProgressDetail, ProgressEvent};
use panora_core::image::ImageRef;
use panora_core::run::RunMetadata;

/// View model built by folding the ordered event stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneView {
    /// Latest progress estimate, `0..=100`.
    pub percent: u8,
    /// Latest status message.
    pub status_message: Option<String>,
    /// Latest structured stage metadata.
    pub detail: Option<ProgressDetail>,
    /// Final image, set on terminal success.
    pub image: Option<ImageRef>,
    /// Room description, set on terminal success.
    pub prompt: Option<String>,
    /// Scene title, set on terminal success.
    pub title: Option<String>,
    /// Run metadata, set on terminal success.
    pub metadata: Option<RunMetadata>,
    /// Terminal failure message, if the run failed.
    pub error: Option<String>,
    /// Whether a terminal event has been folded in.
    pub complete: bool,
    /// Index of the last processed event; `None` before the first one.
    last_processed_index: Option<usize>,
}

impl SceneView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the accumulated stream into the view.
    ///
    /// `stream` is the full ordered sequence delivered so far; only events
    /// past the last processed index are applied. Re-delivery of an
    /// already-seen prefix (or the whole stream) changes nothing.
    pub fn apply_stream(&mut self, stream: &[ProgressEvent]) {
        let start = self.last_processed_index.map_or(0, |i| i + 1);
        if start >= stream.len() {
            return;
        }
        for event in &stream[start..] {
            self.apply(event);
        }
        self.last_processed_index = Some(stream.len() - 1);
    }

    fn apply(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Progress {
                percent,
                message,
                detail,
            } => {
                // Percent is taken as-is: a full retry may legitimately
                // move it backward, and smoothing is a rendering concern.
                self.percent = *percent;
                self.status_message = Some(message.clone());
                self.detail = detail.clone();
                self.error = None;
            }
            ProgressEvent::Result {
                image,
                prompt,
                title,
                metadata,
            } => {
                self.image = Some(image.clone());
                self.prompt = Some(prompt.clone());
                self.title = Some(title.clone());
                self.metadata = Some(metadata.clone());
                self.percent = 100;
                self.status_message = Some("Complete".to_string());
                self.error = None;
                self.complete = true;
            }
            ProgressEvent::Error { message, .. } => {
                self.error = Some(message.clone());
                self.percent = 0;
                self.status_message = None;
                self.complete = true;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ErrorCode;

    fn progress(percent: u8, message: &str) -> ProgressEvent {
        ProgressEvent::Progress {
            percent,
            message: message.to_string(),
            detail: None,
        }
    }

    fn result() -> ProgressEvent {
        ProgressEvent::Result {
            image: ImageRef::new("https://cdn/final.png"),
            prompt: "a cozy reading nook".into(),
            title: "Reading nook".into(),
            metadata: RunMetadata::default(),
        }
    }

    #[test]
    fn folds_progress_then_result() {
        let stream = vec![progress(10, "start"), progress(25, "panorama"), result()];
        let mut view = SceneView::new();
        view.apply_stream(&stream);

        assert!(view.complete);
        assert_eq!(view.percent, 100);
        assert_eq!(view.image.as_ref().unwrap().as_str(), "https://cdn/final.png");
        assert_eq!(view.prompt.as_deref(), Some("a cozy reading nook"));
        assert_eq!(view.status_message.as_deref(), Some("Complete"));
        assert!(view.error.is_none());
    }

    #[test]
    fn double_apply_is_idempotent() {
        let stream = vec![progress(10, "start"), progress(25, "panorama"), result()];
        let mut view = SceneView::new();
        view.apply_stream(&stream);
        let snapshot = view.clone();

        // Re-delivery of the identical accumulated stream must not change
        // any observable state.
        view.apply_stream(&stream);
        assert_eq!(view, snapshot);
    }

    #[test]
    fn incremental_delivery_processes_only_the_suffix() {
        let mut view = SceneView::new();
        view.apply_stream(&[progress(10, "start")]);
        assert_eq!(view.percent, 10);

        view.apply_stream(&[progress(10, "start"), progress(45, "segmenting")]);
        assert_eq!(view.percent, 45);
        assert_eq!(view.status_message.as_deref(), Some("segmenting"));
    }

    #[test]
    fn error_marks_run_failed() {
        let stream = vec![
            progress(10, "start"),
            ProgressEvent::Error {
                message: "Scene generation failed".into(),
                code: ErrorCode::GenerationFailed,
            },
        ];
        let mut view = SceneView::new();
        view.apply_stream(&stream);

        assert!(view.complete);
        assert_eq!(view.error.as_deref(), Some("Scene generation failed"));
        assert_eq!(view.percent, 0);
        assert!(view.image.is_none());
    }

    #[test]
    fn percent_may_move_backward_across_retries() {
        let mut view = SceneView::new();
        view.apply_stream(&[progress(45, "segmenting"), progress(10, "retrying")]);
        assert_eq!(view.percent, 10);
    }

    #[test]
    fn empty_stream_is_a_no_op() {
        let mut view = SceneView::new();
        view.apply_stream(&[]);
        assert_eq!(view, SceneView::new());
    }

    #[test]
    fn progress_clears_previous_transient_error_display() {
        let mut view = SceneView::new();
        view.apply_stream(&[progress(10, "start")]);
        view.error = Some("stale".into());
        view.apply_stream(&[progress(10, "start"), progress(25, "panorama")]);
        assert!(view.error.is_none());
    }
}
