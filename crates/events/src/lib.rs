//! Progress streaming protocol and consumer-side replay.
//!
//! This crate provides the building blocks for delivering generation
//! progress to a remote caller:
//!
//! - [`ProgressEvent`] -- the ordered, tagged event union.
//! - [`WireFrame`] -- the `{type, data, transient}` chunk shape on the wire.
//! - [`channel`] -- ordered in-process channel with a single-terminal
//!   guarantee on the sender.
//! - [`SceneView`] -- idempotent consumer-side fold of the event sequence.
//! - [`ImageCache`] -- bounded, content-addressed LRU for fetched images.

pub mod cache;
pub mod channel;
pub mod progress;
pub mod replay;

pub use cache::ImageCache;
pub use channel::{progress_channel, ProgressReceiver, ProgressSender};
pub use progress::{ErrorCode, ProgressDetail, ProgressEvent, WireFrame};
pub use replay::SceneView;
