//! # Headless Backend
//!
//! A `RenderBackend` that draws nothing and records everything. It hands out
//! fake texture handles, remembers every frame with its batches and the
//! thread that drew it, and can be told to fail at chosen points. The
//! renderer tests and the demo both run against it; a windowed backend
//! plugs into the same trait.
//!
//! ## Inspection
//!
//! The backend is moved into the renderer, so its record lives behind a
//! shared [`HeadlessLog`] handle obtained with [`HeadlessBackend::log`]
//! before the move.

use std::collections::HashSet;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::config::RendererConfig;
use crate::render::api::{BackendResult, FrameInfo, GpuTextureHandle, RenderBackend};
use crate::render::primitives::Viewport;
use crate::render::RenderError;

/// One texture upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    /// Handle returned to the caller
    pub handle: GpuTextureHandle,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bytes per pixel
    pub channels: u8,
    /// Length of the pixel buffer
    pub bytes: usize,
}

/// One `draw_batch` call
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRecord {
    /// Texture the batch was drawn with
    pub texture: GpuTextureHandle,
    /// Interleaved vertex positions
    pub vertices: Vec<f32>,
    /// Interleaved texture coordinates
    pub tex_coords: Vec<f32>,
}

impl BatchRecord {
    /// Number of vertices in the batch
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }
}

/// One frame, from `begin_frame` to `end_frame`
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Frame snapshot passed to `begin_frame`
    pub info: FrameInfo,
    /// Batches in draw order
    pub batches: Vec<BatchRecord>,
    /// Name of the thread that drew the frame
    pub thread: Option<String>,
    /// Whether `end_frame` was reached
    pub presented: bool,
}

/// Everything the headless backend has been asked to do
#[derive(Debug, Default)]
pub struct HeadlessLog {
    /// `initialize` succeeded
    pub initialized: bool,
    /// Number of `release` calls
    pub release_count: usize,
    /// Thread names passed through `make_current`
    pub current_threads: Vec<Option<String>>,
    /// Viewports set, in order
    pub viewports: Vec<Viewport>,
    /// Texture uploads, in order
    pub uploads: Vec<UploadRecord>,
    /// Deleted texture handles, in order
    pub deleted_textures: Vec<GpuTextureHandle>,
    /// Drawn frames, in order
    pub frames: Vec<FrameRecord>,
    /// Errors reported through `check_error`
    pub errors_reported: usize,
}

impl HeadlessLog {
    /// Sequence numbers of the presented frames
    pub fn presented_sequences(&self) -> Vec<u64> {
        self.frames.iter().filter(|f| f.presented).map(|f| f.info.sequence).collect()
    }
}

/// Recording backend with no graphics context
pub struct HeadlessBackend {
    log: Arc<Mutex<HeadlessLog>>,
    next_handle: u64,
    current: Option<FrameRecord>,
    pending_error: Option<String>,
    fail_initialize: bool,
    fail_uploads: bool,
    error_frames: HashSet<u64>,
    frame_delay: Option<Duration>,
    frame_gate: Option<Receiver<()>>,
}

impl HeadlessBackend {
    /// Create a backend with an empty log
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(HeadlessLog::default())),
            next_handle: 1,
            current: None,
            pending_error: None,
            fail_initialize: false,
            fail_uploads: false,
            error_frames: HashSet::new(),
            frame_delay: None,
            frame_gate: None,
        }
    }

    /// Shared handle to the recorded calls
    pub fn log(&self) -> Arc<Mutex<HeadlessLog>> {
        Arc::clone(&self.log)
    }

    /// Make `initialize` fail
    pub fn with_initialize_failure(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    /// Make every texture upload fail
    pub fn with_upload_failure(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    /// Report a backend error from `check_error` after the given frame
    pub fn with_error_on_frame(mut self, sequence: u64) -> Self {
        self.error_frames.insert(sequence);
        self
    }

    /// Sleep in `begin_frame` to simulate a slow GPU
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = Some(delay);
        self
    }

    /// Block in `begin_frame` until a message (or hang-up) arrives on `gate`
    pub fn with_frame_gate(mut self, gate: Receiver<()>) -> Self {
        self.frame_gate = Some(gate);
        self
    }

    fn thread_name() -> Option<String> {
        std::thread::current().name().map(str::to_string)
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for HeadlessBackend {
    fn initialize(&mut self, config: &RendererConfig) -> BackendResult<()> {
        if self.fail_initialize {
            return Err(RenderError::InitializationFailed(format!(
                "headless backend refused shaders {} / {}",
                config.shaders.vertex_shader_path, config.shaders.fragment_shader_path
            )));
        }
        self.log.lock().initialized = true;
        log::debug!(
            "Headless backend initialized for {}x{} virtual resolution",
            config.virtual_width,
            config.virtual_height
        );
        Ok(())
    }

    fn make_current(&mut self) -> BackendResult<()> {
        self.log.lock().current_threads.push(Self::thread_name());
        Ok(())
    }

    fn set_viewport(&mut self, viewport: &Viewport) -> BackendResult<()> {
        self.log.lock().viewports.push(*viewport);
        Ok(())
    }

    fn upload_texture(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        channels: u8,
    ) -> BackendResult<GpuTextureHandle> {
        if self.fail_uploads {
            return Err(RenderError::Backend("upload rejected".to_string()));
        }
        let handle = GpuTextureHandle(self.next_handle);
        self.next_handle += 1;
        self.log.lock().uploads.push(UploadRecord {
            handle,
            width,
            height,
            channels,
            bytes: pixels.len(),
        });
        Ok(handle)
    }

    fn delete_texture(&mut self, handle: GpuTextureHandle) {
        self.log.lock().deleted_textures.push(handle);
    }

    fn begin_frame(&mut self, frame: &FrameInfo) -> BackendResult<()> {
        if let Some(gate) = &self.frame_gate {
            // A hang-up opens the gate for good
            let _ = gate.recv();
        }
        if let Some(delay) = self.frame_delay {
            std::thread::sleep(delay);
        }
        self.current = Some(FrameRecord {
            info: *frame,
            batches: Vec::new(),
            thread: Self::thread_name(),
            presented: false,
        });
        Ok(())
    }

    fn draw_batch(
        &mut self,
        vertices: &[f32],
        tex_coords: &[f32],
        texture: GpuTextureHandle,
    ) -> BackendResult<()> {
        let frame = self
            .current
            .as_mut()
            .ok_or_else(|| RenderError::Backend("draw_batch outside a frame".to_string()))?;
        frame.batches.push(BatchRecord {
            texture,
            vertices: vertices.to_vec(),
            tex_coords: tex_coords.to_vec(),
        });
        Ok(())
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        let mut frame = self
            .current
            .take()
            .ok_or_else(|| RenderError::Backend("end_frame without begin_frame".to_string()))?;
        frame.presented = true;
        if self.error_frames.contains(&frame.info.sequence) {
            self.pending_error = Some(format!("injected error on frame {}", frame.info.sequence));
        }
        self.log.lock().frames.push(frame);
        Ok(())
    }

    fn check_error(&mut self) -> BackendResult<()> {
        match self.pending_error.take() {
            Some(message) => {
                self.log.lock().errors_reported += 1;
                Err(RenderError::Backend(message))
            }
            None => Ok(()),
        }
    }

    fn release(&mut self) {
        let mut log = self.log.lock();
        log.release_count += 1;
        log.initialized = false;
    }
}
