//! # Sprite Renderer
//!
//! Coordinates the double-buffered sprite pipeline between the game thread
//! (the producer) and a dedicated render worker thread.
//!
//! ## Architecture
//!
//! ```text
//!   producer                     handoff (mutex + condvar)           worker
//!   add_sprite -> front buffer
//!   submit ----> wait !rendering && !pending
//!                swap buffers, queue frame --------------------> next_frame
//!   add_sprite -> new front buffer                                 sort, batch, draw
//!                                                 <------------- complete (buffer back)
//! ```
//!
//! - The producer owns the front buffer outright; adding sprites takes no lock.
//! - `submit` swaps buffers only when the worker is idle and nothing is
//!   queued, so a queued frame is never overwritten and the producer never
//!   writes into the buffer being drawn.
//! - The worker is the only thread that issues draw calls.
//!
//! ## Lifecycle
//!
//! Construction is all-or-nothing: the backend is initialized, the worker
//! thread spawned, and the backend error state checked; a failure at any
//! step undoes the earlier ones. `shutdown` (also run on drop) stops the
//! worker without drawing a queued frame, joins it, and releases the backend
//! on the calling thread.

pub mod frame_buffer;
mod handoff;
mod worker;

pub use frame_buffer::FrameBuffer;
pub use handoff::RenderStats;
pub use worker::WorkerState;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use self::handoff::{Frame, FrameHandoff};
use self::worker::{release_all_retired, RenderWorker, SharedBackend};
use crate::assets::TextureAssets;
use crate::core::config::RendererConfig;
use crate::render::api::{FrameInfo, RenderBackend};
use crate::render::primitives::{Camera2d, Sprite, Viewport};
use crate::render::resources::texture::Texture;
use crate::render::systems::batching::SpriteBatcher;
use crate::render::{RenderError, RenderResult};

/// Double-buffered sprite renderer
pub struct SpriteRenderer {
    frames: FrameBuffer,
    handoff: Arc<FrameHandoff>,
    backend: SharedBackend,
    worker: Option<JoinHandle<()>>,
    assets: Option<TextureAssets>,
    camera: Camera2d,
    viewport: Viewport,
    config: RendererConfig,
}

impl SpriteRenderer {
    /// Initialize the backend and start the render worker
    pub fn new(backend: Box<dyn RenderBackend>, config: &RendererConfig) -> RenderResult<Self> {
        Self::start(backend, config, None)
    }

    /// Like [`SpriteRenderer::new`], also releasing textures retired from `assets`
    pub fn with_assets(
        backend: Box<dyn RenderBackend>,
        config: &RendererConfig,
        assets: TextureAssets,
    ) -> RenderResult<Self> {
        Self::start(backend, config, Some(assets))
    }

    fn start(
        mut backend: Box<dyn RenderBackend>,
        config: &RendererConfig,
        assets: Option<TextureAssets>,
    ) -> RenderResult<Self> {
        config.validate()?;

        log::info!(
            "Starting sprite renderer: virtual {}x{}, screen {}x{}",
            config.virtual_width,
            config.virtual_height,
            config.screen_width,
            config.screen_height
        );

        if let Err(e) = backend.initialize(config) {
            log::error!("Backend initialization failed: {}", e);
            backend.release();
            return Err(match e {
                RenderError::InitializationFailed(_) => e,
                other => RenderError::InitializationFailed(other.to_string()),
            });
        }

        let viewport = Viewport::fit(
            config.screen_width,
            config.screen_height,
            config.virtual_width,
            config.virtual_height,
        );
        if let Err(e) = backend.set_viewport(&viewport) {
            log::error!("Failed to set initial viewport: {}", e);
            backend.release();
            return Err(e);
        }
        backend.release_current();

        let backend: SharedBackend = Arc::new(Mutex::new(backend));
        let handoff = Arc::new(FrameHandoff::new());
        let worker = RenderWorker::new(
            Arc::clone(&handoff),
            Arc::clone(&backend),
            SpriteBatcher::new(config.keep_pixels_after_upload),
            assets.clone(),
        );

        let handle = match thread::Builder::new()
            .name(config.worker_thread_name.clone())
            .spawn(move || worker.run())
        {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("Failed to spawn render worker: {}", e);
                backend.lock().release();
                return Err(RenderError::ThreadSpawn(e));
            }
        };

        let mut renderer = Self {
            frames: FrameBuffer::with_capacity(config.sprite_pool_capacity),
            handoff,
            backend,
            worker: Some(handle),
            assets,
            camera: Camera2d::new(),
            viewport,
            config: config.clone(),
        };

        let check = renderer.backend.lock().check_error();
        if let Err(e) = check {
            log::error!("Backend reported an error during startup: {}", e);
            if let Err(shutdown_err) = renderer.shutdown() {
                log::error!("Cleanup after failed startup: {}", shutdown_err);
            }
            return Err(RenderError::InitializationFailed(e.to_string()));
        }

        Ok(renderer)
    }

    /// Append a sprite to the frame being built
    pub fn add_sprite(&mut self, sprite: Sprite) {
        self.frames.push(sprite);
    }

    /// Append several sprites to the frame being built
    pub fn add_sprites(&mut self, sprites: &[Sprite]) {
        self.frames.extend_from_slice(sprites);
    }

    /// Hand the current frame to the worker and start a new one
    ///
    /// Blocks while the worker is still drawing the previous frame or has
    /// not yet picked it up.
    pub fn submit(&mut self) -> RenderResult<()> {
        if self.worker.is_none() {
            return Err(RenderError::ShutDown);
        }

        let camera = self.camera.transform();
        let clear_color = self.config.clear_color;
        let frames = &mut self.frames;

        self.handoff.submit(|recycled| {
            let (sprites, buffer_index, sequence) = frames.swap(recycled);
            Frame {
                info: FrameInfo {
                    sequence,
                    buffer_index,
                    sprite_count: sprites.len(),
                    camera,
                    clear_color,
                },
                sprites,
            }
        })
    }

    /// Block until every submitted frame has been drawn
    pub fn wait_idle(&self) {
        self.handoff.wait_idle();
    }

    /// Refit the viewport to a new screen size
    pub fn resize(&mut self, screen_width: u32, screen_height: u32) -> RenderResult<()> {
        let viewport = Viewport::fit(
            screen_width,
            screen_height,
            self.config.virtual_width,
            self.config.virtual_height,
        );
        self.backend.lock().set_viewport(&viewport)?;

        log::debug!(
            "Resized to {}x{}: viewport {}x{} at ({}, {})",
            screen_width,
            screen_height,
            viewport.width,
            viewport.height,
            viewport.x,
            viewport.y
        );
        self.config.screen_width = screen_width;
        self.config.screen_height = screen_height;
        self.viewport = viewport;
        Ok(())
    }

    /// Replace the camera used for subsequent submits
    pub fn set_camera(&mut self, camera: Camera2d) {
        self.camera = camera;
    }

    /// Current camera
    pub fn camera(&self) -> &Camera2d {
        &self.camera
    }

    /// Current camera, mutably
    pub fn camera_mut(&mut self) -> &mut Camera2d {
        &mut self.camera
    }

    /// Current viewport
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Active configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Sprites added since the last submit
    pub fn pending_sprite_count(&self) -> usize {
        self.frames.len()
    }

    /// Index (0 or 1) of the buffer the producer is filling
    pub fn write_index(&self) -> usize {
        self.frames.write_index()
    }

    /// Delete a texture's GPU copy now
    ///
    /// Waits for any frame in progress, since the backend is locked while drawing.
    pub fn delete_texture(&self, texture: &Texture) -> bool {
        texture.release(&mut **self.backend.lock())
    }

    /// Running totals
    pub fn stats(&self) -> RenderStats {
        self.handoff.stats()
    }

    /// What the worker thread is doing
    pub fn worker_state(&self) -> WorkerState {
        match &self.worker {
            Some(handle) if !handle.is_finished() => {
                if self.handoff.is_rendering() {
                    WorkerState::Rendering
                } else {
                    WorkerState::Idle
                }
            }
            _ => WorkerState::Terminated,
        }
    }

    /// Stop the worker and release the backend
    ///
    /// A frame queued but not yet picked up is not drawn. Calling this more
    /// than once is harmless.
    pub fn shutdown(&mut self) -> RenderResult<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        log::info!("Shutting down sprite renderer");
        self.handoff.shut_down();
        let joined = worker.join();

        let mut backend = self.backend.lock();
        if let Err(e) = backend.make_current() {
            log::warn!("Could not make context current for shutdown: {}", e);
        }
        if let Some(assets) = &self.assets {
            release_all_retired(assets, &mut **backend);
        }
        backend.release();
        drop(backend);

        let stats = self.handoff.stats();
        log::info!(
            "Sprite renderer stopped: {} frames submitted, {} drawn, {} backend errors",
            stats.frames_submitted,
            stats.frames_drawn,
            stats.backend_errors
        );

        joined.map_err(|_| RenderError::WorkerPanicked)
    }
}

impl Drop for SpriteRenderer {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("Error during renderer shutdown: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageData;
    use crate::core::config::AssetConfig;
    use crate::foundation::logging;
    use crate::render::backends::headless::HeadlessBackend;
    use crate::render::primitives::Placement;
    use std::sync::mpsc;
    use std::time::Duration;

    fn config() -> RendererConfig {
        RendererConfig::new(320, 180).with_screen_size(1280, 720)
    }

    fn texture(id: u32) -> Arc<Texture> {
        Arc::new(Texture::new(id, format!("t{}", id), ImageData::solid_color(8, 8, [255; 4])))
    }

    fn sprite(texture: &Arc<Texture>, depth: i16) -> Sprite {
        Sprite::from_texture(Arc::clone(texture), Placement::at(0.0, 0.0).with_depth(depth))
    }

    #[test]
    fn test_frames_drawn_in_submit_order() {
        logging::init_for_tests();
        let backend = HeadlessBackend::new();
        let log = backend.log();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");
        let tex = texture(1);

        const FRAMES: u64 = 40;
        for frame in 0..FRAMES {
            for _ in 0..=(frame % 5) {
                renderer.add_sprite(sprite(&tex, 0));
            }
            renderer.submit().expect("submit");
        }
        renderer.wait_idle();

        let stats = renderer.stats();
        assert_eq!(stats.frames_submitted, FRAMES);
        assert_eq!(stats.frames_drawn, FRAMES);
        renderer.shutdown().expect("shutdown");

        let log = log.lock();
        assert_eq!(log.presented_sequences(), (0..FRAMES).collect::<Vec<_>>());
        for frame in &log.frames {
            let expected = (frame.info.sequence % 5 + 1) as usize;
            assert_eq!(frame.info.sprite_count, expected);
            assert_eq!(frame.batches.len(), 1);
            assert_eq!(frame.batches[0].vertex_count(), expected * 6);
        }
    }

    #[test]
    fn test_buffer_indices_alternate_and_never_collide() {
        let backend = HeadlessBackend::new();
        let log = backend.log();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");

        let mut handed_over = Vec::new();
        for _ in 0..10 {
            let writing = renderer.write_index();
            renderer.submit().expect("submit");
            handed_over.push(writing);
            // After the swap the producer fills the other buffer
            assert_ne!(renderer.write_index(), writing);
        }
        renderer.wait_idle();
        renderer.shutdown().expect("shutdown");

        let log = log.lock();
        for (frame, writing) in log.frames.iter().zip(handed_over) {
            assert_eq!(frame.info.buffer_index, writing);
            assert_eq!(frame.info.buffer_index, (frame.info.sequence % 2) as usize);
        }
    }

    #[test]
    fn test_submit_blocks_while_worker_is_drawing() {
        let (gate, gate_rx) = mpsc::channel();
        let backend = HeadlessBackend::new().with_frame_gate(gate_rx);
        let log = backend.log();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");

        renderer.submit().expect("first submit never waits");

        let (done, done_rx) = mpsc::channel();
        let producer = thread::spawn(move || {
            renderer.submit().expect("second submit");
            done.send(()).expect("test thread alive");
            renderer.wait_idle();
            renderer.shutdown()
        });

        // Frame 0 is stuck in begin_frame, so the second submit cannot swap
        assert!(done_rx.recv_timeout(Duration::from_millis(150)).is_err());

        gate.send(()).expect("worker alive");
        done_rx.recv_timeout(Duration::from_secs(5)).expect("second submit went through");

        drop(gate);
        producer.join().expect("producer thread").expect("clean shutdown");
        assert_eq!(log.lock().presented_sequences(), vec![0, 1]);
    }

    #[test]
    fn test_worker_thread_issues_draws() {
        let backend = HeadlessBackend::new();
        let log = backend.log();
        let config = config();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config).expect("renderer");

        renderer.add_sprite(sprite(&texture(1), 0));
        renderer.submit().expect("submit");
        renderer.wait_idle();
        renderer.shutdown().expect("shutdown");

        let log = log.lock();
        assert_eq!(log.frames[0].thread.as_deref(), Some(config.worker_thread_name.as_str()));
        assert!(log.current_threads.contains(&Some(config.worker_thread_name.clone())));
    }

    #[test]
    fn test_depth_then_texture_order_reaches_backend() {
        let backend = HeadlessBackend::new();
        let log = backend.log();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");
        let (t1, t2) = (texture(1), texture(2));

        renderer.add_sprites(&[sprite(&t1, 2), sprite(&t2, 1), sprite(&t1, 0)]);
        renderer.submit().expect("submit");
        renderer.wait_idle();
        renderer.shutdown().expect("shutdown");

        let log = log.lock();
        let drawn: Vec<_> = log.frames[0].batches.iter().map(|b| b.texture).collect();
        let uploads: Vec<_> = log.uploads.iter().map(|u| u.handle).collect();
        // t1 uploaded first (depth 0), then t2 (depth 1), then t1 again at depth 2
        assert_eq!(drawn, vec![uploads[0], uploads[1], uploads[0]]);
    }

    #[test]
    fn test_empty_frame_is_still_presented() {
        let backend = HeadlessBackend::new();
        let log = backend.log();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");

        renderer.submit().expect("submit");
        renderer.wait_idle();
        renderer.shutdown().expect("shutdown");

        let log = log.lock();
        assert_eq!(log.frames.len(), 1);
        assert!(log.frames[0].batches.is_empty());
    }

    #[test]
    fn test_camera_snapshot_travels_with_frame() {
        let backend = HeadlessBackend::new();
        let log = backend.log();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");

        let mut camera = Camera2d::new();
        camera.move_to(10.0, 4.0);
        renderer.set_camera(camera);
        renderer.submit().expect("submit");

        renderer.camera_mut().move_to(0.0, 0.0);
        renderer.submit().expect("submit");
        renderer.wait_idle();
        renderer.shutdown().expect("shutdown");

        let log = log.lock();
        assert_eq!(log.frames[0].info.camera, camera.transform());
        assert_eq!(log.frames[1].info.camera, Camera2d::new().transform());
    }

    #[test]
    fn test_backend_error_is_counted_and_loop_continues() {
        logging::init_for_tests();
        let backend = HeadlessBackend::new().with_error_on_frame(1);
        let log = backend.log();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");

        for _ in 0..3 {
            renderer.submit().expect("submit");
        }
        renderer.wait_idle();

        let stats = renderer.stats();
        assert_eq!(stats.frames_drawn, 3);
        assert_eq!(stats.backend_errors, 1);
        renderer.shutdown().expect("shutdown");
        assert_eq!(log.lock().errors_reported, 1);
    }

    #[test]
    fn test_initialize_failure_releases_backend() {
        let backend = HeadlessBackend::new().with_initialize_failure();
        let log = backend.log();

        let result = SpriteRenderer::new(Box::new(backend), &config());
        assert!(matches!(result, Err(RenderError::InitializationFailed(_))));

        let log = log.lock();
        assert_eq!(log.release_count, 1);
        assert!(log.frames.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected_before_backend_use() {
        let backend = HeadlessBackend::new();
        let log = backend.log();

        let result = SpriteRenderer::new(Box::new(backend), &RendererConfig::new(0, 0));
        assert!(matches!(result, Err(RenderError::Config(_))));
        assert!(!log.lock().initialized);
    }

    #[test]
    fn test_shutdown_is_idempotent_and_final() {
        let backend = HeadlessBackend::new();
        let log = backend.log();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");
        assert_ne!(renderer.worker_state(), WorkerState::Terminated);

        renderer.shutdown().expect("first shutdown");
        renderer.shutdown().expect("second shutdown");
        assert_eq!(renderer.worker_state(), WorkerState::Terminated);
        assert!(matches!(renderer.submit(), Err(RenderError::ShutDown)));

        drop(renderer);
        assert_eq!(log.lock().release_count, 1);
    }

    #[test]
    fn test_drop_shuts_down() {
        let backend = HeadlessBackend::new();
        let log = backend.log();
        {
            let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");
            renderer.submit().expect("submit");
            renderer.wait_idle();
        }
        let log = log.lock();
        assert_eq!(log.release_count, 1);
        assert_eq!(log.frames.len(), 1);
    }

    #[test]
    fn test_resize_refits_viewport() {
        let backend = HeadlessBackend::new();
        let log = backend.log();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");
        assert_eq!(renderer.viewport().width, 1280);

        renderer.resize(2560, 720).expect("resize");
        assert_eq!(renderer.viewport().width, 1280);
        assert_eq!(renderer.viewport().x, 640);
        assert_eq!(renderer.config().screen_width, 2560);

        renderer.shutdown().expect("shutdown");
        assert_eq!(log.lock().viewports.len(), 2);
    }

    #[test]
    fn test_retired_textures_are_deleted_after_drawing() {
        let assets = TextureAssets::new(AssetConfig::new());
        let backend = HeadlessBackend::new();
        let log = backend.log();
        let mut renderer = SpriteRenderer::with_assets(Box::new(backend), &config(), assets.clone())
            .expect("renderer");

        let lease = assets
            .acquire_with("hero", || Ok(ImageData::solid_color(4, 4, [255; 4])))
            .expect("texture");
        let hero = Sprite::from_texture(Arc::clone(lease.texture()), Placement::default());
        renderer.add_sprite(hero);
        renderer.submit().expect("submit");

        // Dropping the lease while the frame is in flight must not stop it drawing
        drop(lease);
        renderer.submit().expect("submit");
        renderer.wait_idle();
        renderer.shutdown().expect("shutdown");

        let log = log.lock();
        assert_eq!(log.frames[0].batches.len(), 1);
        assert_eq!(log.uploads.len(), 1);
        assert_eq!(log.deleted_textures, vec![log.uploads[0].handle]);
    }

    #[test]
    fn test_texture_retired_while_queued_still_draws() {
        let assets = TextureAssets::new(AssetConfig::new());
        let (gate, gate_rx) = mpsc::channel();
        let backend = HeadlessBackend::new().with_frame_gate(gate_rx);
        let log = backend.log();
        let mut renderer = SpriteRenderer::with_assets(Box::new(backend), &config(), assets.clone())
            .expect("renderer");

        // Frame 0 is held in begin_frame while the producer builds frame 1
        renderer.submit().expect("submit");
        let lease = assets
            .acquire_with("hero", || Ok(ImageData::solid_color(4, 4, [255; 4])))
            .expect("texture");
        let hero = Sprite::from_texture(Arc::clone(lease.texture()), Placement::default());
        renderer.add_sprite(hero);
        drop(lease);

        drop(gate);
        renderer.submit().expect("submit");
        renderer.wait_idle();
        renderer.shutdown().expect("shutdown");

        let log = log.lock();
        assert_eq!(log.frames[1].batches.len(), 1);
        assert_eq!(log.uploads.len(), 1);
        assert_eq!(log.deleted_textures, vec![log.uploads[0].handle]);
    }

    #[test]
    fn test_delete_texture_frees_gpu_copy() {
        let backend = HeadlessBackend::new();
        let log = backend.log();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");
        let tex = texture(9);

        renderer.add_sprite(sprite(&tex, 0));
        renderer.submit().expect("submit");
        renderer.wait_idle();
        assert!(tex.is_uploaded());

        assert!(renderer.delete_texture(&tex));
        assert!(!renderer.delete_texture(&tex));
        renderer.shutdown().expect("shutdown");
        assert_eq!(log.lock().deleted_textures.len(), 1);
    }

    #[test]
    fn test_many_frames_with_slow_worker() {
        let backend = HeadlessBackend::new().with_frame_delay(Duration::from_millis(1));
        let log = backend.log();
        let mut renderer = SpriteRenderer::new(Box::new(backend), &config()).expect("renderer");
        let textures: Vec<_> = (1..=4).map(texture).collect();

        let mut expected_sprites = 0u64;
        for frame in 0..100u64 {
            for i in 0..(frame % 7) {
                let tex = &textures[(i % 4) as usize];
                renderer.add_sprite(sprite(tex, (i % 3) as i16));
                expected_sprites += 1;
            }
            renderer.submit().expect("submit");
        }
        renderer.wait_idle();

        let stats = renderer.stats();
        assert_eq!(stats.frames_drawn, 100);
        assert_eq!(stats.sprites_drawn, expected_sprites);
        renderer.shutdown().expect("shutdown");

        assert_eq!(log.lock().presented_sequences(), (0..100).collect::<Vec<_>>());
    }
}
