//! Rendering backends
//!
//! Implementations of [`RenderBackend`](crate::render::api::RenderBackend).
//! The headless backend records calls instead of drawing and backs the test
//! suite and the demo; a windowed backend implements the same trait.

pub mod headless;

pub use headless::{BatchRecord, FrameRecord, HeadlessBackend, HeadlessLog, UploadRecord};
