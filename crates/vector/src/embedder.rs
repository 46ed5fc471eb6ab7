//! Term-embedding seam for the search client.

use async_trait::async_trait;
use panora_adapters::embed::{EmbedError, EmbeddingClient};

/// Batched text-term embedding.
///
/// The search client calls this exactly once per pass; the production
/// implementation delegates to the gateway's batch endpoint.
#[async_trait]
pub trait TermEmbedder: Send + Sync {
    /// Embed every term in one call; the result is index-aligned with the
    /// input.
    async fn embed_terms(&self, terms: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

#[async_trait]
impl TermEmbedder for EmbeddingClient {
    async fn embed_terms(&self, terms: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        EmbeddingClient::embed_terms(self, terms).await
    }
}
