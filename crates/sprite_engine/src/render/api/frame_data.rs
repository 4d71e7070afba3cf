//! Frame Rendering Data Structures
//!
//! Per-frame data handed from the producer to the render worker alongside
//! the sprite list. Everything here is a snapshot taken at `submit` time.

use crate::foundation::math::Mat4;

/// Snapshot describing one submitted frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Monotonic submit counter, starting at zero
    pub sequence: u64,
    /// Which of the two sprite buffers this frame was built in
    pub buffer_index: usize,
    /// Number of sprites in the frame
    pub sprite_count: usize,
    /// Camera view transform at submit time
    pub camera: Mat4,
    /// Background clear colour
    pub clear_color: [f32; 4],
}
