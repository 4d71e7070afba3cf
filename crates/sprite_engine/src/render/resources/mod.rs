//! GPU resource records
//!
//! Textures shared between the producer and the render worker.

pub mod texture;

pub use texture::{Texture, TextureId};
