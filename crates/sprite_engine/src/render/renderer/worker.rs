//! Render worker thread
//!
//! The worker sleeps on the handoff until a frame is queued, draws it with
//! the backend locked, then hands the emptied buffer back and goes back to
//! sleep. Backend errors are logged and counted; they never stop the loop.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use super::handoff::{Frame, FrameHandoff, FrameReport};
use crate::assets::TextureAssets;
use crate::render::api::RenderBackend;
use crate::render::primitives::Sprite;
use crate::render::resources::texture::Texture;
use crate::render::systems::batching::{BatchStats, SpriteBatcher};

/// Backend shared between the producer and the worker
pub(crate) type SharedBackend = Arc<Mutex<Box<dyn RenderBackend>>>;

/// What the worker thread is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for a frame
    Idle,
    /// Drawing a frame
    Rendering,
    /// Exited
    Terminated,
}

pub(crate) struct RenderWorker {
    handoff: Arc<FrameHandoff>,
    backend: SharedBackend,
    batcher: SpriteBatcher,
    assets: Option<TextureAssets>,
}

impl RenderWorker {
    pub fn new(
        handoff: Arc<FrameHandoff>,
        backend: SharedBackend,
        batcher: SpriteBatcher,
        assets: Option<TextureAssets>,
    ) -> Self {
        Self {
            handoff,
            backend,
            batcher,
            assets,
        }
    }

    /// Thread body: draw frames until shutdown
    pub fn run(mut self) {
        log::info!("Render worker started");
        while let Some(frame) = self.handoff.next_frame() {
            let (sprites, report) = self.render(frame);
            self.handoff.complete(sprites, report);
        }
        log::info!("Render worker stopped");
    }

    fn render(&mut self, frame: Frame) -> (Vec<Sprite>, FrameReport) {
        let start = Instant::now();
        let Frame { info, mut sprites } = frame;
        let mut backend = self.backend.lock();
        let mut backend_errors = 0;

        if let Err(e) = backend.make_current() {
            log::error!("Failed to make context current for frame {}: {}", info.sequence, e);
            backend_errors += 1;
        }

        let batch = match backend.begin_frame(&info) {
            Ok(()) => {
                let stats = self.batcher.draw(&mut sprites, &mut **backend);
                if let Err(e) = backend.end_frame() {
                    log::error!("Failed to present frame {}: {}", info.sequence, e);
                    backend_errors += 1;
                }
                stats
            }
            Err(e) => {
                log::error!("Failed to begin frame {}: {}", info.sequence, e);
                backend_errors += 1;
                BatchStats {
                    sprite_count: sprites.len(),
                    ..BatchStats::default()
                }
            }
        };

        if let Err(e) = backend.check_error() {
            log::error!("Render error after frame {}: {}", info.sequence, e);
            backend_errors += 1;
        }

        // The frame's sprites no longer pin their textures
        sprites.clear();
        if let Some(assets) = &self.assets {
            release_retired(assets, &mut **backend);
        }
        drop(backend);

        log::trace!(
            "Frame {} (buffer {}): {} sprites in {} batches",
            info.sequence,
            info.buffer_index,
            batch.sprite_count,
            batch.batch_count
        );

        let report = FrameReport {
            batch,
            backend_errors,
            frame_time_us: start.elapsed().as_micros() as u64,
        };
        (sprites, report)
    }
}

/// Delete the GPU copies of retired textures that no sprite still uses
///
/// Textures some sprite still holds stay queued for a later frame.
pub(crate) fn release_retired(assets: &TextureAssets, backend: &mut dyn RenderBackend) -> usize {
    delete_textures(&assets.take_unreferenced_retired(), backend)
}

/// Delete the GPU copies of every retired texture, in use or not
pub(crate) fn release_all_retired(
    assets: &TextureAssets,
    backend: &mut dyn RenderBackend,
) -> usize {
    delete_textures(&assets.take_retired(), backend)
}

fn delete_textures(retired: &[Arc<Texture>], backend: &mut dyn RenderBackend) -> usize {
    let deleted = retired.iter().filter(|texture| texture.release(backend)).count();
    if !retired.is_empty() {
        log::debug!("Released {} retired textures ({} on the GPU)", retired.len(), deleted);
    }
    deleted
}
