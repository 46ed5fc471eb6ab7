//! Typed clients for the remote model gateway.
//!
//! One module per external capability. Every client is a plain
//! request/response wrapper over [`reqwest`] with its own error enum, and
//! every error variant reports a typed [`error::ErrorKind`] so callers can
//! classify failures without inspecting message text.

pub mod classify;
pub mod describe;
pub mod embed;
pub mod error;
pub mod http;
pub mod inject;
pub mod panorama;
pub mod prompts;
pub mod segment;
pub mod upscale;
