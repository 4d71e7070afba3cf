//! Sprite quad geometry
//!
//! Each sprite becomes two triangles. Corners are emitted as
//! bottom-left, top-left, top-right, bottom-left, top-right, bottom-right
//! for both positions and texture coordinates, so the two arrays line up
//! vertex for vertex.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{rotate_about, Vec2};
use crate::render::primitives::Sprite;

/// Vertices emitted per sprite
pub const VERTICES_PER_SPRITE: usize = 6;

/// World-space vertex position
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SpriteVertex {
    /// x, y in world units
    pub position: [f32; 2],
}

/// Normalized texture coordinate
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct TexCoord {
    /// u, v in `[0, 1]`; v grows downward in the image
    pub uv: [f32; 2],
}

/// Quad corners in world space: bottom-left, bottom-right, top-left, top-right
pub fn quad_corners(sprite: &Sprite) -> [Vec2; 4] {
    let origin = sprite.placement.position;
    let size = sprite.dimensions();

    let mut corners = [
        origin,
        origin + Vec2::new(size.x, 0.0),
        origin + Vec2::new(0.0, size.y),
        origin + size,
    ];

    let rotation = sprite.placement.rotation;
    if rotation != 0.0 {
        let pivot = sprite.pivot();
        for corner in &mut corners {
            *corner = rotate_about(*corner, rotation, pivot);
        }
    }
    corners
}

/// Append the six vertices of a sprite
pub fn push_vertices(sprite: &Sprite, out: &mut Vec<SpriteVertex>) {
    let [bl, br, tl, tr] = quad_corners(sprite);
    out.extend([bl, tl, tr, bl, tr, br].map(|v| SpriteVertex { position: [v.x, v.y] }));
}

/// Append the six texture coordinates of a sprite
pub fn push_tex_coords(sprite: &Sprite, out: &mut Vec<TexCoord>) {
    let rect = sprite.tex_rect();
    let texture = sprite.texture();
    let tex_w = texture.width().max(1) as f32;
    let tex_h = texture.height().max(1) as f32;

    let mut left = rect.x / tex_w;
    let mut right = (rect.x + rect.w) / tex_w;
    let bottom = (rect.y + rect.h) / tex_h;
    let top = rect.y / tex_h;

    if sprite.placement.flip_x {
        std::mem::swap(&mut left, &mut right);
    }

    out.extend(
        [
            [left, bottom],
            [left, top],
            [right, top],
            [left, bottom],
            [right, top],
            [right, bottom],
        ]
        .map(|uv| TexCoord { uv }),
    );
}
