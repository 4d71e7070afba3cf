//! Atlas-backed sprite pool
//!
//! Pairs a [`TextureAtlas`] with a [`SpriteAllocator`] so game code can
//! spawn sprites by atlas name, move them around through their handles,
//! and push every live sprite into the renderer once per frame.

use thiserror::Error;

use super::sprite_allocator::{AllocatorError, SpriteAllocator, SpriteHandle};
use crate::render::primitives::{Placement, Sprite};
use crate::render::renderer::SpriteRenderer;
use crate::render::systems::atlas::{AtlasError, SpriteRef, TextureAtlas};

/// Errors from pool operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpritePoolError {
    /// Atlas lookup failed
    #[error(transparent)]
    Atlas(#[from] AtlasError),

    /// Allocation or release failed
    #[error(transparent)]
    Allocator(#[from] AllocatorError),
}

/// Pool of sprites drawn from one atlas
#[derive(Debug)]
pub struct AtlasSpritePool {
    atlas: TextureAtlas,
    sprites: SpriteAllocator<Sprite>,
}

impl AtlasSpritePool {
    /// Create a pool with room for `capacity` live sprites
    pub fn new(atlas: TextureAtlas, capacity: usize) -> Self {
        log::debug!(
            "Sprite pool over texture {}: {} entries, {} slots",
            atlas.texture().id(),
            atlas.len(),
            capacity
        );
        Self {
            atlas,
            sprites: SpriteAllocator::new(capacity),
        }
    }

    /// Spawn a sprite from an atlas entry
    pub fn add_sprite<'a>(
        &mut self,
        sprite: impl Into<SpriteRef<'a>>,
        placement: Placement,
    ) -> Result<SpriteHandle, SpritePoolError> {
        let sprite = self.atlas.instantiate(sprite, placement).map_err(|e| {
            log::warn!("Cannot add sprite: {}", e);
            e
        })?;
        let handle = self.sprites.allocate(sprite).map_err(|e| {
            log::warn!("Cannot add sprite: {}", e);
            e
        })?;
        Ok(handle)
    }

    /// Despawn a sprite
    pub fn remove_sprite(&mut self, handle: SpriteHandle) -> Result<Sprite, SpritePoolError> {
        Ok(self.sprites.release(handle)?)
    }

    /// Despawn every sprite
    pub fn clear_sprites(&mut self) {
        self.sprites.clear();
    }

    /// Placement of a live sprite
    pub fn placement(&self, handle: SpriteHandle) -> Option<&Placement> {
        self.sprites.get(handle).map(|sprite| &sprite.placement)
    }

    /// Placement of a live sprite, mutably
    pub fn placement_mut(&mut self, handle: SpriteHandle) -> Option<&mut Placement> {
        self.sprites.get_mut(handle).map(|sprite| &mut sprite.placement)
    }

    /// Visit every live sprite's placement
    pub fn for_each_placement_mut(&mut self, mut f: impl FnMut(SpriteHandle, &mut Placement)) {
        self.sprites.for_each_active_mut(|handle, sprite| f(handle, &mut sprite.placement));
    }

    /// Append every live sprite to the renderer's current frame
    pub fn draw(&self, renderer: &mut SpriteRenderer) {
        for (_, sprite) in self.sprites.iter_active() {
            renderer.add_sprite(sprite.clone());
        }
    }

    /// The atlas sprites are drawn from
    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    /// Number of live sprites
    pub fn len(&self) -> usize {
        self.sprites.active_count()
    }

    /// Whether no sprite is live
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Number of sprites that can still be added
    pub fn remaining(&self) -> usize {
        self.sprites.free_count()
    }
}
