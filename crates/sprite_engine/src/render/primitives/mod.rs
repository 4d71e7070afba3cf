//! Core primitive types for rendering
//!
//! This module contains the plain data the sprite pipeline moves around:
//! texture rectangles, sprite records, the 2D camera and the viewport.

pub mod camera;
pub mod rect;
pub mod sprite;
pub mod viewport;

// Re-export commonly used types
pub use camera::Camera2d;
pub use rect::Rect;
pub use sprite::{Placement, Sprite, SpriteSize};
pub use viewport::Viewport;
