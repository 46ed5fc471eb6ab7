//! Stage seam between the orchestrator and the gateway adapters.
//!
//! Each method maps 1:1 onto one remote capability. [`RemoteStages`] is the
//! production implementation, bundling the adapter clients over one shared
//! connection pool; tests substitute their own [`SceneStages`].

use async_trait::async_trait;
use panora_adapters::classify::{ClassifierClient, ClassifyError};
use panora_adapters::describe::{DescribeClient, DescribeError};
use panora_adapters::embed::{EmbedError, EmbeddingClient};
use panora_adapters::error::ErrorKind;
use panora_adapters::inject::{InjectError, InjectionClient};
use panora_adapters::panorama::{PanoramaClient, PanoramaError};
use panora_adapters::segment::{SegmentationClient, SegmentationError};
use panora_adapters::upscale::{UpscaleClient, UpscaleError};
use panora_core::catalog::Product;
use panora_core::config::GenerationConfig;
use panora_core::conversation::ChatMessage;
use panora_core::image::{ImageRef, PanoramaImage};
use panora_core::segmenting::Segment;

// ---------------------------------------------------------------------------
// StageError
// ---------------------------------------------------------------------------

/// Stage failure as seen by the orchestrator: a typed kind plus the
/// underlying adapter message.
///
/// The orchestrator dispatches on [`kind`](Self::kind) (retry policy,
/// diagnostic hints); the message only ever reaches logs and the step
/// trace.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct StageError {
    kind: ErrorKind,
    message: String,
}

impl StageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<DescribeError> for StageError {
    fn from(e: DescribeError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

impl From<PanoramaError> for StageError {
    fn from(e: PanoramaError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

impl From<SegmentationError> for StageError {
    fn from(e: SegmentationError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

impl From<ClassifyError> for StageError {
    fn from(e: ClassifyError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

impl From<EmbedError> for StageError {
    fn from(e: EmbedError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

impl From<InjectError> for StageError {
    fn from(e: InjectError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

impl From<UpscaleError> for StageError {
    fn from(e: UpscaleError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

// ---------------------------------------------------------------------------
// SceneStages
// ---------------------------------------------------------------------------

/// The remote capabilities the pipeline is built from.
#[async_trait]
pub trait SceneStages: Send + Sync {
    /// Turn the conversation into a detailed room description.
    async fn describe_room(&self, messages: &[ChatMessage]) -> Result<String, StageError>;

    /// Render the panorama from the description.
    async fn generate_panorama(
        &self,
        description: &str,
        config: &GenerationConfig,
    ) -> Result<PanoramaImage, StageError>;

    /// Detect furniture-candidate segments in the panorama.
    async fn segment(&self, image: &ImageRef) -> Result<Vec<Segment>, StageError>;

    /// Select the segment ids that are catalogable furniture.
    async fn filter_catalogable(
        &self,
        segments: &[Segment],
        image: &ImageRef,
    ) -> Result<Vec<String>, StageError>;

    /// Embed one segment's cropped image plus label.
    async fn embed_segment(&self, segment: &Segment) -> Result<Vec<f32>, StageError>;

    /// Render matched products into the panorama.
    async fn inject_products(
        &self,
        image: &ImageRef,
        products: &[Product],
    ) -> Result<ImageRef, StageError>;

    /// Upscale the current best image.
    async fn upscale(&self, image: &ImageRef) -> Result<ImageRef, StageError>;
}

// ---------------------------------------------------------------------------
// RemoteStages
// ---------------------------------------------------------------------------

/// Production [`SceneStages`] over the model gateway adapters.
pub struct RemoteStages {
    describe: DescribeClient,
    panorama: PanoramaClient,
    segmentation: SegmentationClient,
    classifier: ClassifierClient,
    embedding: EmbeddingClient,
    injection: InjectionClient,
    upscaler: UpscaleClient,
}

impl RemoteStages {
    /// Build all adapter clients against one gateway, sharing a single
    /// [`reqwest::Client`] for connection pooling.
    pub fn new(base_url: String, api_token: String) -> Self {
        let client = reqwest::Client::new();
        Self {
            describe: DescribeClient::with_client(
                client.clone(),
                base_url.clone(),
                api_token.clone(),
            ),
            panorama: PanoramaClient::with_client(
                client.clone(),
                base_url.clone(),
                api_token.clone(),
            ),
            segmentation: SegmentationClient::with_client(
                client.clone(),
                base_url.clone(),
                api_token.clone(),
            ),
            classifier: ClassifierClient::with_client(
                client.clone(),
                base_url.clone(),
                api_token.clone(),
            ),
            embedding: EmbeddingClient::with_client(
                client.clone(),
                base_url.clone(),
                api_token.clone(),
            ),
            injection: InjectionClient::with_client(
                client.clone(),
                base_url.clone(),
                api_token.clone(),
            ),
            upscaler: UpscaleClient::with_client(client, base_url, api_token),
        }
    }
}

#[async_trait]
impl SceneStages for RemoteStages {
    async fn describe_room(&self, messages: &[ChatMessage]) -> Result<String, StageError> {
        Ok(self.describe.describe_room(messages).await?)
    }

    async fn generate_panorama(
        &self,
        description: &str,
        config: &GenerationConfig,
    ) -> Result<PanoramaImage, StageError> {
        Ok(self.panorama.generate(description, config).await?)
    }

    async fn segment(&self, image: &ImageRef) -> Result<Vec<Segment>, StageError> {
        let objects = self.segmentation.segment(image).await?;
        // Segment ids are scoped to this run; the embedding endpoint crops
        // the region out of the working image via the bounding box.
        Ok(objects
            .into_iter()
            .enumerate()
            .map(|(i, object)| Segment {
                id: format!("seg-{i}"),
                bounding_box: object.bounding_box,
                label: object.label,
                cropped_image: image.clone(),
            })
            .collect())
    }

    async fn filter_catalogable(
        &self,
        segments: &[Segment],
        image: &ImageRef,
    ) -> Result<Vec<String>, StageError> {
        Ok(self.classifier.filter_catalogable(segments, image).await?)
    }

    async fn embed_segment(&self, segment: &Segment) -> Result<Vec<f32>, StageError> {
        Ok(self.embedding.embed_segment(segment).await?)
    }

    async fn inject_products(
        &self,
        image: &ImageRef,
        products: &[Product],
    ) -> Result<ImageRef, StageError> {
        Ok(self.injection.inject_products(image, products).await?)
    }

    async fn upscale(&self, image: &ImageRef) -> Result<ImageRef, StageError> {
        Ok(self.upscaler.upscale(image).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panora_adapters::http::HttpFailure;

    #[test]
    fn stage_error_preserves_adapter_kind() {
        let adapter_err = DescribeError::Http(HttpFailure::Api {
            status: 500,
            body: "boom".into(),
        });
        let stage_err = StageError::from(adapter_err);
        assert_eq!(stage_err.kind(), ErrorKind::Service);
        assert!(stage_err.to_string().contains("boom"));
    }

    #[test]
    fn stage_error_displays_message_only() {
        let err = StageError::new(ErrorKind::Timeout, "deadline exceeded");
        assert_eq!(err.to_string(), "deadline exceeded");
    }
}
