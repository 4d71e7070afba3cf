//! # Sprite Records
//!
//! A sprite is a textured, optionally rotated and flipped quad placed in
//! virtual-resolution world space. Sprites are plain values: the producer
//! builds them, copies them into the front buffer, and the render worker
//! consumes them once the buffer has been handed over.
//!
//! ## Immutable Source
//!
//! The texture and its sub-rectangle are fixed when a sprite is created,
//! typically by `TextureAtlas::instantiate`. Everything describing *where*
//! the sprite is drawn lives in the public [`Placement`] and can be changed
//! freely between frames.

use std::sync::Arc;

use super::rect::Rect;
use crate::foundation::math::Vec2;
use crate::render::resources::texture::{Texture, TextureId};

/// How a sprite's on-screen size is derived
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpriteSize {
    /// Texture-rect size multiplied by a uniform factor
    Scale(f32),
    /// Explicit size in world units
    Explicit {
        /// Width in world units
        width: f32,
        /// Height in world units
        height: f32,
    },
}

impl Default for SpriteSize {
    fn default() -> Self {
        SpriteSize::Scale(1.0)
    }
}

/// Where and how a sprite is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Bottom-left corner in world units
    pub position: Vec2,
    /// Rotation pivot, relative to `position`
    pub anchor: Vec2,
    /// Size rule
    pub size: SpriteSize,
    /// Counter-clockwise rotation in radians about the anchor
    pub rotation: f32,
    /// Draw order; lower depths are drawn first
    pub depth: i16,
    /// Mirror the texture horizontally
    pub flip_x: bool,
}

impl Placement {
    /// Placement at a position with every other field defaulted
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// Set the rotation pivot, relative to the position
    pub fn with_anchor(mut self, x: f32, y: f32) -> Self {
        self.anchor = Vec2::new(x, y);
        self
    }

    /// Scale the texture-rect size uniformly
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.size = SpriteSize::Scale(scale);
        self
    }

    /// Use an explicit world-space size
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = SpriteSize::Explicit { width, height };
        self
    }

    /// Set the rotation in radians
    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    /// Set the depth
    pub fn with_depth(mut self, depth: i16) -> Self {
        self.depth = depth;
        self
    }

    /// Mirror horizontally
    pub fn with_flip_x(mut self, flip: bool) -> Self {
        self.flip_x = flip;
        self
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            anchor: Vec2::zeros(),
            size: SpriteSize::default(),
            rotation: 0.0,
            depth: 0,
            flip_x: false,
        }
    }
}

/// A drawable sprite
#[derive(Debug, Clone)]
pub struct Sprite {
    /// Mutable placement
    pub placement: Placement,
    texture: Arc<Texture>,
    tex_rect: Rect,
}

impl Sprite {
    /// Create a sprite from a texture region
    ///
    /// A zero `tex_rect` selects the whole texture.
    pub fn new(texture: Arc<Texture>, tex_rect: Rect, placement: Placement) -> Self {
        let tex_rect = tex_rect.resolve(texture.width(), texture.height());
        Self {
            placement,
            texture,
            tex_rect,
        }
    }

    /// Sprite covering the whole texture
    pub fn from_texture(texture: Arc<Texture>, placement: Placement) -> Self {
        Self::new(texture, Rect::ZERO, placement)
    }

    /// Texture this sprite samples from
    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    /// Id of the texture this sprite samples from
    pub fn texture_id(&self) -> TextureId {
        self.texture.id()
    }

    /// Resolved texture sub-rectangle, in pixels
    pub fn tex_rect(&self) -> Rect {
        self.tex_rect
    }

    /// Draw depth
    pub fn depth(&self) -> i16 {
        self.placement.depth
    }

    /// World-space width and height
    pub fn dimensions(&self) -> Vec2 {
        match self.placement.size {
            SpriteSize::Scale(scale) => Vec2::new(self.tex_rect.w * scale, self.tex_rect.h * scale),
            SpriteSize::Explicit { width, height } => Vec2::new(width, height),
        }
    }

    /// Rotation pivot in world space
    pub fn pivot(&self) -> Vec2 {
        self.placement.position + self.placement.anchor
    }
}
