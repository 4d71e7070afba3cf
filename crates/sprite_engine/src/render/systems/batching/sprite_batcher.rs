//! # Sprite Batcher
//!
//! Orders a frame's sprites and groups them into per-texture draw calls.
//!
//! ## Ordering
//!
//! Sprites are sorted by depth ascending, then by texture id ascending.
//! The sort is stable, so sprites equal on both keys keep their submission
//! order. Depth always wins over batching: a texture that appears at two
//! depths with another texture between them is drawn as two batches.
//!
//! ## Batching
//!
//! One linear walk over the sorted list emits a batch at every texture
//! change and one at the end. [`sort_and_batch`] and [`SpriteBatcher::draw`]
//! share that walk through [`batch_sorted`].

use std::sync::Arc;
use std::time::Instant;

use super::geometry::{
    push_tex_coords, push_vertices, SpriteVertex, TexCoord, VERTICES_PER_SPRITE,
};
use crate::render::api::RenderBackend;
use crate::render::primitives::Sprite;
use crate::render::resources::texture::Texture;

/// One texture's worth of consecutive sprites
#[derive(Debug, Clone)]
pub struct DrawBatch {
    /// Texture shared by every sprite in the batch
    pub texture: Arc<Texture>,
    /// Six vertices per sprite
    pub vertices: Vec<SpriteVertex>,
    /// Six texture coordinates per sprite
    pub tex_coords: Vec<TexCoord>,
}

impl DrawBatch {
    /// Build the batch for one run of sprites sharing a texture
    fn from_run(run: &[Sprite]) -> Self {
        let mut batch = Self {
            texture: Arc::clone(run[0].texture()),
            vertices: Vec::with_capacity(run.len() * VERTICES_PER_SPRITE),
            tex_coords: Vec::with_capacity(run.len() * VERTICES_PER_SPRITE),
        };
        for sprite in run {
            push_vertices(sprite, &mut batch.vertices);
            push_tex_coords(sprite, &mut batch.tex_coords);
        }
        batch
    }

    /// Number of sprites in the batch
    pub fn sprite_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_SPRITE
    }
}

/// Statistics for one draw pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Sprites in the frame
    pub sprite_count: usize,
    /// Batches handed to the backend
    pub batch_count: usize,
    /// Batches dropped because of an upload or draw error
    pub skipped_batches: usize,
    /// Sprites in the dropped batches
    pub skipped_sprites: usize,
    /// Textures uploaded during the pass
    pub uploads: usize,
    /// Time spent sorting (microseconds)
    pub sort_time_us: u64,
    /// Time spent building and submitting batches (microseconds)
    pub submission_time_us: u64,
}

impl BatchStats {
    /// Calculate average sprites per submitted batch
    pub fn avg_sprites_per_batch(&self) -> f32 {
        if self.batch_count == 0 {
            0.0
        } else {
            (self.sprite_count - self.skipped_sprites) as f32 / self.batch_count as f32
        }
    }
}

/// Stable sort by depth, then texture id
pub fn sort_sprites(sprites: &mut [Sprite]) {
    sprites.sort_by_key(|sprite| (sprite.depth(), sprite.texture_id()));
}

/// Group already sorted sprites into one batch per texture run
pub fn batch_sorted(sprites: &[Sprite]) -> impl Iterator<Item = DrawBatch> + '_ {
    sprites
        .chunk_by(|a, b| a.texture_id() == b.texture_id())
        .map(DrawBatch::from_run)
}

/// Sort sprites in place and group them into draw batches
pub fn sort_and_batch(sprites: &mut [Sprite]) -> Vec<DrawBatch> {
    sort_sprites(sprites);
    batch_sorted(sprites).collect()
}

/// Draws sorted sprite batches through a backend
#[derive(Debug, Default)]
pub struct SpriteBatcher {
    keep_pixels: bool,
    last_stats: BatchStats,
}

impl SpriteBatcher {
    /// Create a batcher
    ///
    /// `keep_pixels` controls whether textures keep their CPU copy after upload.
    pub fn new(keep_pixels: bool) -> Self {
        Self {
            keep_pixels,
            ..Self::default()
        }
    }

    /// Sort, batch and draw a frame's sprites
    ///
    /// A batch whose texture cannot be uploaded, or whose draw call fails,
    /// is logged and skipped; the rest of the frame still draws.
    pub fn draw(&mut self, sprites: &mut [Sprite], backend: &mut dyn RenderBackend) -> BatchStats {
        let mut stats = BatchStats {
            sprite_count: sprites.len(),
            ..BatchStats::default()
        };

        let sort_start = Instant::now();
        sort_sprites(sprites);
        stats.sort_time_us = sort_start.elapsed().as_micros() as u64;

        let submit_start = Instant::now();
        for batch in batch_sorted(sprites) {
            let count = batch.sprite_count();
            let texture = &batch.texture;

            let was_uploaded = texture.is_uploaded();
            let handle = match texture.ensure_uploaded(backend, self.keep_pixels) {
                Ok(handle) => handle,
                Err(e) => {
                    log::error!("Skipping batch of {} sprites: {}", count, e);
                    stats.skipped_batches += 1;
                    stats.skipped_sprites += count;
                    continue;
                }
            };
            if !was_uploaded {
                stats.uploads += 1;
            }

            let vertices: &[f32] = bytemuck::cast_slice(&batch.vertices);
            let tex_coords: &[f32] = bytemuck::cast_slice(&batch.tex_coords);
            match backend.draw_batch(vertices, tex_coords, handle) {
                Ok(()) => stats.batch_count += 1,
                Err(e) => {
                    log::warn!("Draw of texture {} failed: {}", texture.id(), e);
                    stats.skipped_batches += 1;
                    stats.skipped_sprites += count;
                }
            }
        }
        stats.submission_time_us = submit_start.elapsed().as_micros() as u64;

        log::trace!(
            "Drew {} sprites in {} batches ({:.1} per batch)",
            stats.sprite_count - stats.skipped_sprites,
            stats.batch_count,
            stats.avg_sprites_per_batch()
        );
        self.last_stats = stats;
        stats
    }

    /// Statistics from the most recent `draw`
    pub fn last_stats(&self) -> BatchStats {
        self.last_stats
    }
}
