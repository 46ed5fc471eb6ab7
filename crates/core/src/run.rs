//! Per-run metadata.
//!
//! A run is one end-to-end pipeline execution for a single generation
//! request. Its `steps` trace is the sole audit log of everything that
//! degraded along the way; entries are appended in order and never
//! reordered or mutated.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// Human-auditable summary of one completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Wall-clock time from first attempt to terminal event, in
    /// milliseconds. Includes retry backoff delays.
    pub processing_time_ms: u64,
    /// Ordered trace of what happened, including recoverable failures.
    pub steps: Vec<String>,
    /// Number of segments the detection stage reported.
    pub furniture_items_found: usize,
    /// Catalog products actually matched (holes already filtered out).
    pub matched_products: Vec<Product>,
}
