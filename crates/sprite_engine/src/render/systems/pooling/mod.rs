//! Sprite pooling sub-system
//!
//! Fixed-capacity sprite allocation and atlas-backed sprite pools.

pub mod atlas_pool;
pub mod sprite_allocator;

pub use atlas_pool::{AtlasSpritePool, SpritePoolError};
pub use sprite_allocator::{
    ActiveIter, AllocatorError, AllocatorResult, SpriteAllocator, SpriteHandle,
};
