//! Asset management system
//!
//! Decodes images and tracks which textures are loaded, how many users
//! each one has, and which ones are ready to be released from the GPU.

pub mod image_loader;
pub mod texture_assets;

pub use image_loader::ImageData;
pub use texture_assets::{LoadedAtlas, TextureAssets, TextureLease};

use thiserror::Error;

use crate::config::ConfigError;
use crate::render::systems::atlas::AtlasError;

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Asset system errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Every texture slot is in use
    #[error("Texture table full: {capacity} textures already loaded")]
    CapacityExhausted {
        /// Table capacity
        capacity: usize,
    },

    /// Two different paths hash to the same key
    #[error("Asset path '{path}' collides with loaded asset '{existing}'")]
    PathCollision {
        /// Requested path
        path: String,
        /// Path already loaded under the same hash
        existing: String,
    },

    /// Atlas descriptor could not be read
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] ConfigError),

    /// Atlas descriptor is inconsistent
    #[error("Atlas error: {0}")]
    Atlas(#[from] AtlasError),
}
