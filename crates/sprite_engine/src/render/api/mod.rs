//! Public rendering API
//!
//! This module contains the backend trait the renderer drives and the
//! per-frame data handed to it.

pub mod frame_data;
pub mod render_backend;

// Re-export commonly used types
pub use frame_data::FrameInfo;
pub use render_backend::{BackendResult, GpuTextureHandle, RenderBackend};
