//! Letterboxed viewport for a fixed virtual resolution

use crate::foundation::math::{orthographic, Mat4};

/// Screen region the virtual resolution is drawn into
///
/// The virtual aspect ratio is preserved: a screen that is too tall gets
/// bars above and below (letterbox), one that is too wide gets bars on the
/// sides (pillarbox).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in screen pixels
    pub x: u32,
    /// Bottom edge in screen pixels
    pub y: u32,
    /// Width in screen pixels
    pub width: u32,
    /// Height in screen pixels
    pub height: u32,
    /// Orthographic projection over the virtual resolution
    pub projection: Mat4,
}

impl Viewport {
    /// Fit a virtual resolution into a screen
    pub fn fit(
        screen_width: u32,
        screen_height: u32,
        virtual_width: u32,
        virtual_height: u32,
    ) -> Self {
        let aspect = virtual_width as f32 / virtual_height.max(1) as f32;

        let mut width = screen_width;
        let mut height = (width as f32 / aspect).round() as u32;

        if height > screen_height {
            height = screen_height;
            width = (height as f32 * aspect).round() as u32;
        }

        Self {
            x: (screen_width / 2).saturating_sub(width / 2),
            y: (screen_height / 2).saturating_sub(height / 2),
            width,
            height,
            projection: orthographic(0.0, virtual_width as f32, 0.0, virtual_height as f32),
        }
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
