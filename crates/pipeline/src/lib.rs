//! Scene generation pipeline.
//!
//! [`orchestrator::SceneOrchestrator`] sequences the remote stages,
//! enforces the recoverable-failure policy, owns the outer retry loop, and
//! reports everything through a progress channel. The [`stages::SceneStages`]
//! trait is the seam between the orchestration logic and the gateway
//! adapters.

pub mod furniture;
pub mod orchestrator;
pub mod stages;

pub use furniture::FurnitureMatching;
pub use orchestrator::SceneOrchestrator;
pub use stages::{RemoteStages, SceneStages, StageError};
