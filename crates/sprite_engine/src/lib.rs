//! # Sprite Engine
//!
//! A double-buffered 2D sprite renderer. Game code builds a frame of sprites
//! while a dedicated render thread sorts, batches and draws the previous one.
//!
//! ## Features
//!
//! - **Double Buffering**: Lock-free sprite submission with a single handoff per frame
//! - **Depth/Texture Batching**: Stable depth sort with per-texture draw batches
//! - **Texture Atlases**: Named sub-rectangles loaded from TOML or RON descriptors
//! - **Sprite Pools**: Fixed-capacity O(1) sprite allocation with generation-checked handles
//! - **Texture Assets**: Reference-counted texture table with lazy GPU upload
//! - **Pluggable Backends**: Any graphics API behind the `RenderBackend` trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sprite_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::load_or_default("sprite_demo.toml")?;
//!     let assets = TextureAssets::new(config.assets.clone());
//!     let lease = assets.acquire("hero.png")?;
//!
//!     let mut renderer = SpriteRenderer::with_assets(
//!         Box::new(HeadlessBackend::new()),
//!         &config.renderer,
//!         assets.clone(),
//!     )?;
//!
//!     for frame in 0..60 {
//!         let placement = Placement::at(frame as f32, 10.0).with_depth(1);
//!         renderer.add_sprite(Sprite::from_texture(Arc::clone(lease.texture()), placement));
//!         renderer.submit()?;
//!     }
//!     renderer.shutdown()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;
pub mod assets;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, ImageData, LoadedAtlas, TextureAssets, TextureLease},
        config::Config,
        core::config::{ApplicationConfig, AssetConfig, EngineConfig, RendererConfig, ShaderConfig},
        foundation::math::{Mat4, Vec2},
        render::{
            AtlasDescriptor, AtlasEntry, AtlasError, AtlasSpritePool, Camera2d, HeadlessBackend,
            Placement, Rect, RenderBackend, RenderError, RenderStats, Sprite, SpriteAllocator,
            SpriteHandle, SpriteRef, SpriteRenderer, SpriteSize, Texture, TextureAtlas, Viewport,
        },
    };
}
