//! Batch rendering system
//!
//! Sorts a frame's sprites and batches them into per-texture draw calls.

pub mod geometry;
pub mod sprite_batcher;

// Re-export all batching types
pub use geometry::{SpriteVertex, TexCoord, VERTICES_PER_SPRITE};
pub use sprite_batcher::{
    batch_sorted, sort_and_batch, sort_sprites, BatchStats, DrawBatch, SpriteBatcher,
};
