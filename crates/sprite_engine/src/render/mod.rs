//! # Rendering System
//!
//! This module provides the sprite rendering core: a double-buffered
//! submission pipeline that decouples game-logic updates from draw
//! submission on a dedicated render thread.
//!
//! ## Architecture
//!
//! - **SpriteRenderer**: Producer-facing coordinator (`add_sprite`, `submit`, `shutdown`)
//! - **RenderWorker**: Background thread that sorts, batches and draws the back buffer
//! - **SpriteBatcher**: Depth/texture sort and texture-run batching
//! - **TextureAtlas / SpriteAllocator**: Named sub-rectangles and pooled sprite records
//! - **RenderBackend**: Opaque graphics service (upload texture, draw batch, check error)
//!
//! ## Threading
//!
//! Exactly two threads touch the pipeline. The producer owns the front sprite
//! list outright; the worker owns whatever frame was handed to it. The only
//! lock on the hot path is the handoff lock taken once per `submit`.

pub mod api;
pub mod backends;
pub mod primitives;
pub mod renderer;
pub mod resources;
pub mod systems;

pub use api::{BackendResult, FrameInfo, GpuTextureHandle, RenderBackend};
pub use backends::headless::{HeadlessBackend, HeadlessLog};
pub use primitives::{Camera2d, Placement, Rect, Sprite, SpriteSize, Viewport};
pub use renderer::{RenderStats, SpriteRenderer, WorkerState};
pub use resources::texture::{Texture, TextureId};
pub use systems::atlas::{
    AtlasDescriptor, AtlasEntry, AtlasError, AtlasResult, SpriteRef, TextureAtlas,
};
pub use systems::batching::{BatchStats, DrawBatch, SpriteBatcher, SpriteVertex, TexCoord};
pub use systems::pooling::{
    AllocatorError, AllocatorResult, AtlasSpritePool, SpriteAllocator, SpriteHandle,
    SpritePoolError,
};

use crate::config::ConfigError;
use thiserror::Error;

/// Result type for renderer operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised by the renderer and its graphics backend
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error reported by the graphics backend (draw, upload, `check_error`)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Backend or renderer resources could not be created
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// The render worker thread could not be started
    #[error("Failed to spawn render worker: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    /// The render worker thread panicked
    #[error("Render worker panicked")]
    WorkerPanicked,

    /// Operation attempted after `shutdown`
    #[error("Renderer has been shut down")]
    ShutDown,

    /// Texture could not be uploaded
    #[error("Texture {id} upload failed: {reason}")]
    TextureUpload {
        /// Id of the texture that failed
        id: TextureId,
        /// Backend or state reason
        reason: String,
    },

    /// Invalid renderer configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
