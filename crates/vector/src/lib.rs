//! Approximate furniture matching against the product vector index.
//!
//! [`client::VectorSearchClient`] implements the term-search algorithm
//! (normalize → batch embed → batch nearest-neighbor → lexical fallback →
//! dedupe → single threshold relaxation) over two seams: a
//! [`embedder::TermEmbedder`] and an [`index::PointSearch`] transport.
//! The production transport is a Qdrant-style HTTP API.

pub mod client;
pub mod embedder;
pub mod index;

pub use client::{ProductLookup, SearchError, VectorSearchClient};
