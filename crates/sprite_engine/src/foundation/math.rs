//! Math utilities and types
//!
//! Provides the 2D math types used by sprite geometry, cameras and viewports.

pub use nalgebra::{Matrix4, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Rotate `point` by `angle` radians (counter-clockwise) around `pivot`
pub fn rotate_about(point: Vec2, angle: f32, pivot: Vec2) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    let offset = point - pivot;
    Vec2::new(
        offset.x * cos - offset.y * sin + pivot.x,
        offset.x * sin + offset.y * cos + pivot.y,
    )
}

/// Orthographic projection covering `[left, right] x [bottom, top]`
///
/// Depth range is fixed to `[-1, 1]`, which is all a 2D sprite pass needs.
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32) -> Mat4 {
    Mat4::new_orthographic(left, right, bottom, top, -1.0, 1.0)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}
