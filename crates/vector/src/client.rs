//! Product search client.
//!
//! `search` never errors: a degraded index or embedder yields an empty
//! result list, logged but not propagated. Callers that need to tell "no
//! matches" from "service down" must look at the logs; the pipeline treats
//! both as "nothing to inject".

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use panora_core::catalog::Product;
use panora_core::terms::normalize_terms;

use crate::embedder::TermEmbedder;
use crate::index::{IndexError, PointSearch, ScoredPoint, SearchQuery};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Similarity threshold for the strict first pass.
pub const PRIMARY_SCORE_THRESHOLD: f32 = 0.45;

/// Similarity threshold for the single relaxed retry after a zero-result
/// strict pass. There is no further relaxation beyond this.
pub const RELAXED_SCORE_THRESHOLD: f32 = 0.30;

/// Candidates requested per term query.
pub const PER_QUERY_LIMIT: usize = 5;

/// Cap on deduplicated products returned from one search.
pub const MAX_RESULTS: usize = 5;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the per-segment lookup path.
///
/// Only [`VectorSearchClient::nearest`] surfaces errors; the term-search
/// path degrades to an empty result instead.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Index(#[from] IndexError),
}

// ---------------------------------------------------------------------------
// VectorSearchClient
// ---------------------------------------------------------------------------

/// Nearest-neighbor product search over the catalog index.
pub struct VectorSearchClient {
    embedder: Arc<dyn TermEmbedder>,
    index: Arc<dyn PointSearch>,
}

impl VectorSearchClient {
    pub fn new(embedder: Arc<dyn TermEmbedder>, index: Arc<dyn PointSearch>) -> Self {
        Self { embedder, index }
    }

    /// Find catalog products matching the given furniture terms.
    ///
    /// 1. Normalize and deduplicate the terms.
    /// 2. Embed them in one batched call.
    /// 3. Query the index once per term (limit 5, threshold 0.45).
    /// 4. Accept candidates scoring at or above the threshold, or whose
    ///    indexed text contains a query term verbatim.
    /// 5. Dedupe by product id, first seen wins.
    /// 6. If nothing was accepted, repeat the query once at 0.30.
    ///
    /// Returns at most [`MAX_RESULTS`] products in first-seen order. Never
    /// errors; an empty input or a degraded backend yields an empty list
    /// without further network calls.
    pub async fn search(&self, terms: &[String]) -> Vec<Product> {
        if terms.is_empty() {
            return Vec::new();
        }

        let normalized = normalize_terms(terms);
        if normalized.is_empty() {
            return Vec::new();
        }

        let embeddings = match self.embedder.embed_terms(&normalized).await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                tracing::warn!(error = %e, "Term embedding failed, returning no matches");
                return Vec::new();
            }
        };

        let mut accepted = match self
            .search_pass(&embeddings, &normalized, PRIMARY_SCORE_THRESHOLD)
            .await
        {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "Strict search pass failed, returning no matches");
                return Vec::new();
            }
        };

        // Relax the threshold only on a total miss; a partial result is
        // never widened.
        if accepted.is_empty() {
            tracing::debug!(
                terms = normalized.len(),
                "Strict pass found nothing, retrying at relaxed threshold",
            );
            accepted = match self
                .search_pass(&embeddings, &normalized, RELAXED_SCORE_THRESHOLD)
                .await
            {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %e, "Relaxed search pass failed, returning no matches");
                    return Vec::new();
                }
            };
        }

        if accepted.is_empty() {
            tracing::debug!(?normalized, "No product matches for terms");
        }

        accepted.into_values().take(MAX_RESULTS).collect()
    }

    /// Single top-1 lookup for one segment embedding.
    ///
    /// Uses the strict threshold with no relaxation -- absence is handled
    /// by the caller's hole semantics, not by widening the match.
    pub async fn nearest(&self, embedding: &[f32]) -> Result<Option<Product>, SearchError> {
        let queries = [SearchQuery {
            vector: embedding.to_vec(),
            limit: 1,
            score_threshold: PRIMARY_SCORE_THRESHOLD,
            with_payload: true,
        }];

        let mut results = self.index.search_batch(&queries).await?;
        let top = results
            .pop()
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|point| point.payload)
            .and_then(|payload| payload.into_product());
        Ok(top)
    }

    /// Run one batched pass at the given threshold and collect accepted
    /// candidates into an insertion-ordered map keyed by product id.
    async fn search_pass(
        &self,
        embeddings: &[Vec<f32>],
        terms: &[String],
        threshold: f32,
    ) -> Result<IndexMap<String, Product>, SearchError> {
        let queries: Vec<SearchQuery> = embeddings
            .iter()
            .map(|vector| SearchQuery {
                vector: vector.clone(),
                limit: PER_QUERY_LIMIT,
                score_threshold: threshold,
                with_payload: true,
            })
            .collect();

        let results = self.index.search_batch(&queries).await?;

        let mut accepted: IndexMap<String, Product> = IndexMap::new();
        for batch in results {
            for point in batch {
                consider(&mut accepted, point, terms, threshold);
            }
        }
        Ok(accepted)
    }
}

/// Accept a candidate if it clears the score threshold or its indexed text
/// contains a query term verbatim (the lexical fallback). First-seen wins;
/// there is no re-ranking across terms.
fn consider(
    accepted: &mut IndexMap<String, Product>,
    point: ScoredPoint,
    terms: &[String],
    threshold: f32,
) {
    let Some(payload) = point.payload else {
        return;
    };

    let text = payload.text.as_deref().unwrap_or("").to_lowercase();
    let keyword_hit = terms.iter().any(|t| text.contains(t.as_str()));

    if point.score >= threshold || keyword_hit {
        if let Some(product) = payload.into_product() {
            accepted.entry(product.id.clone()).or_insert(product);
        }
    }
}

// ---------------------------------------------------------------------------
// ProductLookup
// ---------------------------------------------------------------------------

/// Per-segment top-1 lookup seam used by the furniture sub-pipeline.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn nearest(&self, embedding: &[f32]) -> Result<Option<Product>, SearchError>;
}

#[async_trait]
impl ProductLookup for VectorSearchClient {
    async fn nearest(&self, embedding: &[f32]) -> Result<Option<Product>, SearchError> {
        VectorSearchClient::nearest(self, embedding).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
