use std::sync::Arc;

use panora_pipeline::SceneOrchestrator;
use panora_vector::VectorSearchClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The generation pipeline, constructed once at startup.
    pub orchestrator: Arc<SceneOrchestrator>,
    /// Term-based product search; `None` when no vector index is
    /// configured. The same client backs the pipeline's per-segment
    /// lookups.
    pub product_search: Option<Arc<VectorSearchClient>>,
}
