//! Pipeline orchestrator.
//!
//! One orchestrator serves many runs; each run walks describe -> panorama
//! -> optional furniture matching -> optional upscale -> done. Description
//! and panorama failures abort the attempt and feed the outer retry loop;
//! everything downstream of the panorama is best-effort.

use std::sync::Arc;
use std::time::Duration;

use panora_adapters::error::ErrorKind;
use panora_core::catalog::Product;
use panora_core::config::GenerationConfig;
use panora_core::conversation::ChatMessage;
use panora_core::image::ImageRef;
use panora_core::run::RunMetadata;
use panora_core::types::SceneId;
use panora_events::{ErrorCode, ProgressSender};
use tokio_util::sync::CancellationToken;

use crate::furniture::{run_furniture_matching, FurnitureMatching};
use crate::stages::{SceneStages, StageError};

/// Base unit of the linear retry backoff: attempt `n` waits `n` times this
/// long before the next attempt.
pub const RETRY_BACKOFF_UNIT: Duration = Duration::from_millis(1000);

/// Characters of the room description quoted into the step trace.
const DESCRIPTION_PREVIEW_CHARS: usize = 100;

// ---------------------------------------------------------------------------
// SceneOrchestrator
// ---------------------------------------------------------------------------

/// Drives one generation run end to end, reporting through the progress
/// channel. Cheap to share: construct once, wrap in `Arc`, call
/// [`run`](Self::run) per request.
pub struct SceneOrchestrator {
    stages: Arc<dyn SceneStages>,
    furniture: FurnitureMatching,
}

struct AttemptOutput {
    image: ImageRef,
    prompt: String,
    metadata: RunMetadata,
}

enum AttemptError {
    /// A non-recoverable stage failed; the outer loop decides on a retry.
    Stage(StageError),
    /// The caller is gone; stop without a terminal event.
    Cancelled,
}

impl SceneOrchestrator {
    pub fn new(stages: Arc<dyn SceneStages>, furniture: FurnitureMatching) -> Self {
        Self { stages, furniture }
    }

    /// Whether furniture matching can run at all for this deployment.
    pub fn furniture_available(&self) -> bool {
        self.furniture.is_available()
    }

    /// Execute one run.
    ///
    /// Always emits exactly one terminal event on `progress` -- unless
    /// `cancel` fires first, in which case the run stops quietly between
    /// stages and nothing more is emitted.
    pub async fn run(
        &self,
        messages: &[ChatMessage],
        scene_id: SceneId,
        title: &str,
        config: &GenerationConfig,
        progress: ProgressSender,
        cancel: CancellationToken,
    ) {
        let started = tokio::time::Instant::now();
        let mut carried_failures: Vec<String> = Vec::new();
        let mut last_error: Option<StageError> = None;

        for attempt in 1..=config.max_retries {
            if cancel.is_cancelled() {
                tracing::info!(%scene_id, attempt, "Run cancelled before attempt");
                return;
            }

            match self
                .run_attempt(messages, config, &progress, &cancel, started, &carried_failures)
                .await
            {
                Ok(output) => {
                    tracing::info!(
                        %scene_id,
                        attempt,
                        products = output.metadata.matched_products.len(),
                        elapsed_ms = output.metadata.processing_time_ms,
                        "Scene generation completed",
                    );
                    progress.result(output.image, output.prompt, title.to_string(), output.metadata);
                    return;
                }
                Err(AttemptError::Cancelled) => {
                    tracing::info!(%scene_id, attempt, "Run cancelled mid-attempt");
                    return;
                }
                Err(AttemptError::Stage(e)) => {
                    tracing::error!(%scene_id, attempt, error = %e, "Generation attempt failed");
                    carried_failures.push(format!("Attempt {attempt} failed: {e}"));
                    last_error = Some(e);

                    if attempt < config.max_retries {
                        progress.progress(
                            10,
                            format!(
                                "Retrying scene generation (attempt {}/{})...",
                                attempt + 1,
                                config.max_retries
                            ),
                        );
                        let delay = RETRY_BACKOFF_UNIT * attempt;
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                }
            }
        }

        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Scene generation failed after all retries".to_string());
        tracing::error!(%scene_id, retries = config.max_retries, "Scene generation exhausted retries");
        progress.error(message, ErrorCode::GenerationFailed);
    }

    /// One pass of the stage state machine.
    ///
    /// `prior_failures` seeds the fresh step trace so the final metadata
    /// still accounts for earlier abandoned attempts.
    async fn run_attempt(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
        progress: &ProgressSender,
        cancel: &CancellationToken,
        started: tokio::time::Instant,
        prior_failures: &[String],
    ) -> Result<AttemptOutput, AttemptError> {
        let mut steps: Vec<String> = prior_failures.to_vec();

        // -- DescribeRoom --
        progress.progress(10, "Getting things ready...");
        steps.push("Started room description generation".to_string());
        let description = self
            .stages
            .describe_room(messages)
            .await
            .map_err(AttemptError::Stage)?;
        steps.push(format!(
            "Generated room description: {}...",
            truncate(&description, DESCRIPTION_PREVIEW_CHARS)
        ));

        if cancel.is_cancelled() {
            return Err(AttemptError::Cancelled);
        }

        // -- GeneratePanorama --
        progress.progress(25, "Generating panoramic image...");
        steps.push("Started panoramic image generation".to_string());
        let panorama = self
            .stages
            .generate_panorama(&description, config)
            .await
            .map_err(AttemptError::Stage)?;
        steps.push("Generated base panoramic image".to_string());

        if cancel.is_cancelled() {
            return Err(AttemptError::Cancelled);
        }

        // -- FurnitureMatching (best-effort) --
        let mut final_image = panorama.durable.clone();
        let mut items_found = 0usize;
        let mut matched_products: Vec<Product> = Vec::new();

        match &self.furniture {
            FurnitureMatching::Available(lookup) if config.include_furniture_matching => {
                match run_furniture_matching(
                    self.stages.as_ref(),
                    lookup.as_ref(),
                    &panorama,
                    progress,
                    &mut steps,
                )
                .await
                {
                    Ok(outcome) => {
                        final_image = outcome.image;
                        items_found = outcome.items_found;
                        matched_products = outcome.matched_products;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Furniture integration failed, using base image");
                        steps.push(format!("Furniture integration failed: {e}"));
                        if let Some(hint) = degradation_hint(e.kind()) {
                            steps.push(hint.to_string());
                        }
                    }
                }
            }
            _ => {
                steps.push("Furniture matching skipped (disabled or unavailable)".to_string());
            }
        }

        if cancel.is_cancelled() {
            return Err(AttemptError::Cancelled);
        }

        // -- Upscale (best-effort) --
        if config.enable_upscaling {
            progress.progress(95, "Enhancing image quality...");
            steps.push("Started image upscaling".to_string());
            match self.stages.upscale(&final_image).await {
                Ok(upscaled) => {
                    final_image = upscaled;
                    steps.push("Image upscaled successfully".to_string());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Image upscaling failed, using original image");
                    steps.push(format!("Image upscaling failed: {e}"));
                }
            }
        } else {
            steps.push("Image upscaling skipped (disabled)".to_string());
        }

        // -- Done --
        progress.progress(100, "Scene generation complete!");
        steps.push("Scene generation completed successfully".to_string());

        let metadata = RunMetadata {
            processing_time_ms: started.elapsed().as_millis() as u64,
            steps,
            furniture_items_found: items_found,
            matched_products,
        };

        Ok(AttemptOutput {
            image: final_image,
            prompt: description,
            metadata,
        })
    }
}

/// Diagnostic hint appended to the step trace after a furniture
/// degradation, chosen by failure kind.
fn degradation_hint(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::Service | ErrorKind::InvalidResponse => {
            Some("Service configuration issue detected - check gateway and index settings")
        }
        ErrorKind::Timeout | ErrorKind::Network => Some("Network timeout - retry may be needed"),
    }
}

/// First `max_chars` characters of `text`, on a char boundary.
fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
