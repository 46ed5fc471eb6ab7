//! Furniture-matching sub-pipeline.
//!
//! Detect segments, filter them to catalogable furniture, search the
//! product index per segment, inject the matches. Everything in here is
//! best-effort: errors that escape to the orchestrator degrade the run
//! (panorama ships without furniture), they never abort it.

use std::sync::Arc;

use futures::future::join_all;
use indexmap::IndexMap;
use panora_core::catalog::Product;
use panora_core::image::{ImageRef, PanoramaImage};
use panora_core::segmenting::Segment;
use panora_events::{ProgressDetail, ProgressSender};
use panora_vector::ProductLookup;

use crate::stages::{SceneStages, StageError};

/// Furniture service availability, decided once at orchestrator
/// construction. The pipeline never re-checks configuration mid-run.
pub enum FurnitureMatching {
    Available(Arc<dyn ProductLookup>),
    Unavailable,
}

impl FurnitureMatching {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// What the sub-pipeline produced for this run.
pub struct FurnitureOutcome {
    /// Best image so far: injected when injection succeeded, otherwise the
    /// unmodified panorama.
    pub image: ImageRef,
    /// Segments the detection stage reported, before any filtering.
    pub items_found: usize,
    /// Products matched by the per-segment search, holes filtered out.
    pub matched_products: Vec<Product>,
}

impl FurnitureOutcome {
    fn without_products(panorama: &PanoramaImage, items_found: usize) -> Self {
        Self {
            image: panorama.durable.clone(),
            items_found,
            matched_products: Vec::new(),
        }
    }
}

/// Run the sub-pipeline against one generated panorama.
///
/// Segmentation and classification failures propagate to the caller (who
/// treats them as recoverable). Per-segment embed/search failures degrade
/// to holes; an injection failure keeps the pre-injection image. Every
/// degradation lands in `steps`.
pub(crate) async fn run_furniture_matching(
    stages: &dyn SceneStages,
    lookup: &dyn ProductLookup,
    panorama: &PanoramaImage,
    progress: &ProgressSender,
    steps: &mut Vec<String>,
) -> Result<FurnitureOutcome, StageError> {
    progress.progress(30, "Analyzing furniture in the image...");
    steps.push("Started furniture integration".to_string());

    progress.progress_with_detail(
        45,
        "Detecting objects in the scene...",
        ProgressDetail::SegmentationPreview {
            image: panorama.working.clone(),
        },
    );
    let segments = stages.segment(&panorama.working).await?;
    let items_found = segments.len();
    steps.push(format!("Detected {items_found} objects in the scene"));

    if segments.is_empty() {
        steps.push("No objects detected in the scene, skipping furniture matching".to_string());
        return Ok(FurnitureOutcome::without_products(panorama, 0));
    }

    progress.progress(55, "Extracting furniture segments...");
    steps.push(format!("Extracted {items_found} furniture segments"));

    progress.progress(65, "Filtering furniture for catalog compatibility...");
    let selected_ids = stages.filter_catalogable(&segments, &panorama.working).await?;
    let filtered: Vec<Segment> = segments
        .into_iter()
        .filter(|s| selected_ids.contains(&s.id))
        .collect();
    steps.push(format!(
        "Filtered to {} catalogable furniture items",
        filtered.len()
    ));

    if filtered.is_empty() {
        steps.push("No catalogable furniture found, using base image".to_string());
        return Ok(FurnitureOutcome::without_products(panorama, items_found));
    }

    progress.progress(75, "Searching for matching catalog products...");
    let products = search_segments(stages, lookup, &filtered, steps).await;
    steps.push(format!("Found {} matching catalog products", products.len()));

    if products.is_empty() {
        steps.push("No matching catalog products found, using base image".to_string());
        return Ok(FurnitureOutcome::without_products(panorama, items_found));
    }

    progress.progress(
        85,
        format!("Integrating {} catalog products into the scene...", products.len()),
    );
    let image = match stages.inject_products(&panorama.durable, &products).await {
        Ok(injected) => {
            steps.push("Catalog products integrated into scene".to_string());
            injected
        }
        Err(e) => {
            // Injection is the last best-effort hop: keep the pre-injection
            // panorama and the matched products for the metadata.
            tracing::warn!(error = %e, "Product injection failed, keeping base panorama");
            steps.push(format!("Product injection failed: {e}"));
            panorama.durable.clone()
        }
    };

    Ok(FurnitureOutcome {
        image,
        items_found,
        matched_products: products,
    })
}

/// Fan out one embed + top-1 lookup per segment, concurrently.
///
/// The fan-in waits for every segment to settle; one segment's failure
/// leaves a hole without touching the others. Holes are recorded in
/// `steps` and filtered before counting.
async fn search_segments(
    stages: &dyn SceneStages,
    lookup: &dyn ProductLookup,
    segments: &[Segment],
    steps: &mut Vec<String>,
) -> Vec<Product> {
    let lookups = segments.iter().map(|segment| async move {
        let embedding = match stages.embed_segment(segment).await {
            Ok(embedding) => embedding,
            Err(e) => return (segment, Err(e.to_string())),
        };
        match lookup.nearest(&embedding).await {
            Ok(product) => (segment, Ok(product)),
            Err(e) => (segment, Err(e.to_string())),
        }
    });

    let mut matched: IndexMap<String, Product> = IndexMap::new();
    for (segment, outcome) in join_all(lookups).await {
        match outcome {
            Ok(Some(product)) => {
                matched.entry(product.id.clone()).or_insert(product);
            }
            Ok(None) => {
                tracing::debug!(segment = %segment.id, label = %segment.label, "No product match");
            }
            Err(message) => {
                steps.push(format!(
                    "Product search failed for segment '{}': {message}",
                    segment.label
                ));
            }
        }
    }
    matched.into_values().collect()
}
