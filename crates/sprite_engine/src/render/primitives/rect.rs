//! Axis-aligned rectangle in texture pixel space

use serde::{Deserialize, Serialize};

/// Region of a texture, in pixels
///
/// A zero width or height means "the full texture" along that axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// The empty rectangle, meaning the whole texture
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, w: 0.0, h: 0.0 };

    /// Create a rectangle
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Whether all four components are zero
    pub fn is_empty(&self) -> bool {
        *self == Self::ZERO
    }

    /// Replace zero dimensions with the full texture extent
    pub fn resolve(&self, texture_width: u32, texture_height: u32) -> Self {
        Self {
            x: self.x,
            y: self.y,
            w: if self.w == 0.0 { texture_width as f32 } else { self.w },
            h: if self.h == 0.0 { texture_height as f32 } else { self.h },
        }
    }
}

impl From<[f32; 4]> for Rect {
    fn from([x, y, w, h]: [f32; 4]) -> Self {
        Self { x, y, w, h }
    }
}
