//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait a graphics backend implements so the
//! sprite renderer can drive it without knowing which API sits underneath.
//! The backend is opaque: it compiles shaders, owns GPU textures, accepts
//! batched vertex and texture-coordinate arrays, and reports errors.
//!
//! ## Threading
//!
//! A backend is created on the producer thread and then shared with the
//! render worker behind a mutex. Every call happens with that mutex held,
//! so implementations never see concurrent calls. Backends whose context is
//! bound to a thread use `make_current` / `release_current` to move it.

use crate::core::config::RendererConfig;
use crate::render::api::frame_data::FrameInfo;
use crate::render::primitives::Viewport;
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a texture resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuTextureHandle(pub u64);

/// Main rendering backend trait
pub trait RenderBackend: Send {
    /// Compile shaders and create device resources
    fn initialize(&mut self, config: &RendererConfig) -> BackendResult<()>;

    /// Bind the graphics context to the calling thread
    fn make_current(&mut self) -> BackendResult<()>;

    /// Unbind the graphics context from the calling thread
    fn release_current(&mut self) {}

    /// Set the screen viewport and projection
    fn set_viewport(&mut self, viewport: &Viewport) -> BackendResult<()>;

    /// Upload pixel data and return a handle to the GPU texture
    ///
    /// `pixels` is tightly packed, `channels` bytes per pixel, rows top to bottom.
    fn upload_texture(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        channels: u8,
    ) -> BackendResult<GpuTextureHandle>;

    /// Delete a GPU texture
    fn delete_texture(&mut self, handle: GpuTextureHandle);

    /// Start a frame: clear, bind the sprite program, set the camera
    fn begin_frame(&mut self, frame: &FrameInfo) -> BackendResult<()>;

    /// Draw one texture batch
    ///
    /// `vertices` and `tex_coords` hold interleaved `x, y` / `u, v` pairs,
    /// six per sprite, two triangles per quad.
    fn draw_batch(
        &mut self,
        vertices: &[f32],
        tex_coords: &[f32],
        texture: GpuTextureHandle,
    ) -> BackendResult<()>;

    /// Finish a frame and present it
    fn end_frame(&mut self) -> BackendResult<()>;

    /// Report and clear any pending backend error
    fn check_error(&mut self) -> BackendResult<()>;

    /// Destroy every resource created by `initialize`
    ///
    /// Called exactly once, on the thread that owns the context at shutdown
    /// or when construction fails part way through.
    fn release(&mut self);
}
