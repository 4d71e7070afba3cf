//! # 2D Camera
//!
//! A translate-then-scale camera over the virtual-resolution world. The
//! renderer snapshots the camera transform into each submitted frame so the
//! worker never reads camera state the producer is still changing.

use crate::foundation::math::{Mat4, Vec2, Vec3};

/// 2D camera with a position and per-axis zoom
///
/// The world point at `position` maps to the bottom-left of the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2d {
    /// World-space position of the view origin
    pub position: Vec2,
    /// Zoom factor per axis; `1.0` is unscaled
    pub zoom: Vec2,
}

impl Camera2d {
    /// Camera at the origin with no zoom
    pub fn new() -> Self {
        Self {
            position: Vec2::zeros(),
            zoom: Vec2::new(1.0, 1.0),
        }
    }

    /// Move the camera by a world-space offset
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.position += Vec2::new(dx, dy);
    }

    /// Move the camera to a world-space position
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    /// Multiply the current zoom
    pub fn zoom_by(&mut self, sx: f32, sy: f32) {
        self.zoom.component_mul_assign(&Vec2::new(sx, sy));
    }

    /// Set the zoom directly
    pub fn zoom_to(&mut self, sx: f32, sy: f32) {
        self.zoom = Vec2::new(sx, sy);
    }

    /// View transform: translate by `-position`, then scale by `zoom`
    pub fn transform(&self) -> Mat4 {
        let translate = Mat4::new_translation(&Vec3::new(-self.position.x, -self.position.y, 0.0));
        let scale = Mat4::new_nonuniform_scaling(&Vec3::new(self.zoom.x, self.zoom.y, 1.0));
        translate * scale
    }
}

impl Default for Camera2d {
    fn default() -> Self {
        Self::new()
    }
}
