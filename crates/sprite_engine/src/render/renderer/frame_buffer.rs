//! Producer-side front buffer
//!
//! The producer appends sprites here with no locking; the buffer is its
//! exclusive property until `submit` swaps it for the recycled back buffer.

use crate::render::primitives::Sprite;

/// The sprite list the producer is currently filling
#[derive(Debug, Default)]
pub struct FrameBuffer {
    front: Vec<Sprite>,
    write_index: usize,
    next_sequence: u64,
}

impl FrameBuffer {
    /// Create a buffer with room for `capacity` sprites
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            front: Vec::with_capacity(capacity),
            write_index: 0,
            next_sequence: 0,
        }
    }

    /// Append a sprite
    pub fn push(&mut self, sprite: Sprite) {
        self.front.push(sprite);
    }

    /// Append several sprites
    pub fn extend_from_slice(&mut self, sprites: &[Sprite]) {
        self.front.extend_from_slice(sprites);
    }

    /// Sprites added since the last swap
    pub fn sprites(&self) -> &[Sprite] {
        &self.front
    }

    /// Number of sprites added since the last swap
    pub fn len(&self) -> usize {
        self.front.len()
    }

    /// Whether nothing was added since the last swap
    pub fn is_empty(&self) -> bool {
        self.front.is_empty()
    }

    /// Index (0 or 1) of the buffer being filled
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Sequence number the next submitted frame will get
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Hand out the filled buffer and start filling `recycled`
    ///
    /// Returns the filled sprites, the index they were written under, and
    /// the frame's sequence number.
    pub(crate) fn swap(&mut self, mut recycled: Vec<Sprite>) -> (Vec<Sprite>, usize, u64) {
        recycled.clear();
        let filled = std::mem::replace(&mut self.front, recycled);
        let index = self.write_index;
        let sequence = self.next_sequence;

        self.write_index = (self.write_index + 1) % 2;
        self.next_sequence += 1;
        (filled, index, sequence)
    }
}
