//! # Textures
//!
//! CPU-side texture records shared between the producer (which builds
//! sprites that reference them) and the render worker (which uploads them
//! on first use). Upload is lazy: a texture carries its decoded pixels
//! until the worker draws a batch that needs it.
//!
//! ## Locking
//!
//! Each texture guards its pixels and GPU handle with its own mutex, so the
//! upload-once check is safe even if a texture is shared by several
//! renderers. The `uploaded` flag is readable without the lock.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::assets::ImageData;
use crate::render::api::{BackendResult, GpuTextureHandle, RenderBackend};
use crate::render::RenderError;

/// Texture identifier, unique among live textures
pub type TextureId = u32;

#[derive(Debug)]
struct TextureState {
    pixels: Option<Vec<u8>>,
    gpu: Option<GpuTextureHandle>,
}

/// A texture that can be lazily uploaded to the backend
#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    label: String,
    width: u32,
    height: u32,
    channels: u8,
    uploaded: AtomicBool,
    state: Mutex<TextureState>,
}

impl Texture {
    /// Create a texture from decoded image data
    pub fn new(id: TextureId, label: impl Into<String>, image: ImageData) -> Self {
        Self {
            id,
            label: label.into(),
            width: image.width,
            height: image.height,
            channels: image.channels,
            uploaded: AtomicBool::new(false),
            state: Mutex::new(TextureState {
                pixels: Some(image.data),
                gpu: None,
            }),
        }
    }

    /// Texture id
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Path or name the texture was created from
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Whether a GPU copy exists
    pub fn is_uploaded(&self) -> bool {
        self.uploaded.load(Ordering::Acquire)
    }

    /// Whether CPU pixel data is still held
    pub fn has_pixels(&self) -> bool {
        self.state.lock().pixels.is_some()
    }

    /// GPU handle, if uploaded
    pub fn gpu_handle(&self) -> Option<GpuTextureHandle> {
        self.state.lock().gpu
    }

    /// Upload the texture if it is not already on the GPU
    ///
    /// Returns the GPU handle. When `keep_pixels` is false the CPU copy is
    /// dropped once the upload succeeds.
    pub fn ensure_uploaded(
        &self,
        backend: &mut dyn RenderBackend,
        keep_pixels: bool,
    ) -> BackendResult<GpuTextureHandle> {
        let mut state = self.state.lock();
        if let Some(handle) = state.gpu {
            return Ok(handle);
        }

        let pixels = state.pixels.as_deref().ok_or_else(|| RenderError::TextureUpload {
            id: self.id,
            reason: "no pixel data".to_string(),
        })?;

        let handle = backend
            .upload_texture(pixels, self.width, self.height, self.channels)
            .map_err(|e| RenderError::TextureUpload {
                id: self.id,
                reason: e.to_string(),
            })?;

        log::debug!(
            "Uploaded texture {} '{}' ({}x{})",
            self.id,
            self.label,
            self.width,
            self.height
        );

        state.gpu = Some(handle);
        if !keep_pixels {
            state.pixels = None;
        }
        self.uploaded.store(true, Ordering::Release);
        Ok(handle)
    }

    /// Delete the GPU copy and drop the CPU pixels
    ///
    /// Returns `true` if a GPU texture was deleted.
    pub fn release(&self, backend: &mut dyn RenderBackend) -> bool {
        let mut state = self.state.lock();
        state.pixels = None;
        match state.gpu.take() {
            Some(handle) => {
                backend.delete_texture(handle);
                self.uploaded.store(false, Ordering::Release);
                log::debug!("Deleted texture {} '{}'", self.id, self.label);
                true
            }
            None => false,
        }
    }
}
