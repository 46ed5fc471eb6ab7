//! Ordered progress channel.
//!
//! The sender half enforces the protocol's core invariant at runtime: at
//! most one terminal event per run, and nothing after it. The receiver is
//! a plain `mpsc` receiver; the transport layer drains it in order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::progress::{ErrorCode, ProgressDetail, ProgressEvent};
use panora_core::image::ImageRef;
use panora_core::run::RunMetadata;

/// Receiver half: an ordered stream of [`ProgressEvent`]s ending after the
/// terminal event (the channel closes when every sender is dropped).
pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

/// Create a connected progress channel.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ProgressSender {
            inner: Arc::new(SenderInner {
                tx,
                terminal_sent: AtomicBool::new(false),
            }),
        },
        rx,
    )
}

struct SenderInner {
    tx: mpsc::UnboundedSender<ProgressEvent>,
    terminal_sent: AtomicBool,
}

/// Sender half of the progress channel.
///
/// Cheaply cloneable so a watchdog can hold one alongside the pipeline.
/// After a terminal event has been emitted (by any clone), every further
/// emission is silently discarded -- first terminal wins.
#[derive(Clone)]
pub struct ProgressSender {
    inner: Arc<SenderInner>,
}

impl ProgressSender {
    /// Emit a transient progress update.
    pub fn progress(&self, percent: u8, message: impl Into<String>) {
        self.send(ProgressEvent::Progress {
            percent,
            message: message.into(),
            detail: None,
        });
    }

    /// Emit a transient progress update with structured stage metadata.
    pub fn progress_with_detail(
        &self,
        percent: u8,
        message: impl Into<String>,
        detail: ProgressDetail,
    ) {
        self.send(ProgressEvent::Progress {
            percent,
            message: message.into(),
            detail: Some(detail),
        });
    }

    /// Emit the terminal success event.
    pub fn result(&self, image: ImageRef, prompt: String, title: String, metadata: RunMetadata) {
        self.send_terminal(ProgressEvent::Result {
            image,
            prompt,
            title,
            metadata,
        });
    }

    /// Emit the terminal failure event.
    pub fn error(&self, message: impl Into<String>, code: ErrorCode) {
        self.send_terminal(ProgressEvent::Error {
            message: message.into(),
            code,
        });
    }

    /// Whether a terminal event has already been emitted.
    pub fn is_terminated(&self) -> bool {
        self.inner.terminal_sent.load(Ordering::SeqCst)
    }

    fn send(&self, event: ProgressEvent) {
        if self.inner.terminal_sent.load(Ordering::SeqCst) {
            return;
        }
        // A closed channel only means the consumer is gone; the pipeline
        // keeps its own cancellation signal for that case.
        let _ = self.inner.tx.send(event);
    }

    fn send_terminal(&self, event: ProgressEvent) {
        if self.inner.terminal_sent.swap(true, Ordering::SeqCst) {
            tracing::debug!("Discarding extra terminal event after stream end");
            return;
        }
        let _ = self.inner.tx.send(event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(mut rx: ProgressReceiver) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn events_arrive_in_emission_order() {
        let (tx, rx) = progress_channel();
        tx.progress(10, "Getting things ready...");
        tx.progress(25, "Generating panoramic image...");
        drop(tx);

        let events = drain(rx);
        assert_eq!(events.len(), 2);
        assert_matches::assert_matches!(
            &events[0],
            ProgressEvent::Progress { percent: 10, .. }
        );
        assert_matches::assert_matches!(
            &events[1],
            ProgressEvent::Progress { percent: 25, .. }
        );
    }

    #[tokio::test]
    async fn result_and_error_never_both_delivered() {
        let (tx, rx) = progress_channel();
        tx.result(
            ImageRef::new("https://cdn/final.png"),
            "prompt".into(),
            "title".into(),
            RunMetadata::default(),
        );
        tx.error("too late", ErrorCode::GenerationFailed);
        drop(tx);

        let events = drain(rx);
        assert_eq!(events.len(), 1);
        assert_matches::assert_matches!(&events[0], ProgressEvent::Result { .. });
    }

    #[tokio::test]
    async fn progress_after_terminal_is_discarded() {
        let (tx, rx) = progress_channel();
        tx.error("failed", ErrorCode::GenerationFailed);
        tx.progress(50, "ghost update");
        drop(tx);

        let events = drain(rx);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_terminal());
    }

    #[tokio::test]
    async fn terminal_exclusivity_holds_across_clones() {
        let (tx, rx) = progress_channel();
        let watchdog = tx.clone();

        tx.result(
            ImageRef::new("https://cdn/final.png"),
            "p".into(),
            "t".into(),
            RunMetadata::default(),
        );
        watchdog.error("budget exceeded", ErrorCode::GenerationFailed);
        drop(tx);
        drop(watchdog);

        let events = drain(rx);
        assert_eq!(events.len(), 1);
        assert_matches::assert_matches!(&events[0], ProgressEvent::Result { .. });
    }

    #[tokio::test]
    async fn send_to_disconnected_consumer_does_not_panic() {
        let (tx, rx) = progress_channel();
        drop(rx);
        tx.progress(10, "nobody listening");
        tx.error("still nobody", ErrorCode::GenerationFailed);
    }
}
