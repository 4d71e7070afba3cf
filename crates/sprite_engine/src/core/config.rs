//! # Unified Configuration System
//!
//! This module consolidates the configuration structures for the sprite
//! pipeline into a single, coherent system: renderer settings, asset table
//! limits and core engine behavior.
//!
//! ## Design Goals
//!
//! - **Centralized**: All configuration types in one place for easy discovery
//! - **Serializable**: Support for multiple config file formats (TOML, RON)
//! - **Type Safe**: Strong typing with validation and defaults

use serde::{Serialize, Deserialize};
use std::path::Path;

pub use crate::config::{Config, ConfigError};

/// Default number of slots in a sprite pool
pub const DEFAULT_SPRITE_POOL_CAPACITY: usize = 5000;

/// Largest sprite pool a configuration may ask for
///
/// Frame buffers reserve this many sprites up front, and pool slot indices
/// are `u32`.
pub const MAX_SPRITE_POOL_CAPACITY: usize = 1 << 20;

/// Default number of textures the asset table can hold at once
pub const DEFAULT_MAX_TEXTURES: usize = 32;

/// # Shader Configuration
///
/// Paths of the sprite vertex and fragment shaders handed to the backend at
/// initialization. Compiling them is the backend's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// Path to the vertex shader source
    pub vertex_shader_path: String,
    /// Path to the fragment shader source
    pub fragment_shader_path: String,
}

impl ShaderConfig {
    /// Create a new shader configuration
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_shader_path: vertex_path.into(),
            fragment_shader_path: fragment_path.into(),
        }
    }

    /// Create shader config with automatic path resolution
    ///
    /// Tries a few common locations so applications can run from different
    /// working directories.
    pub fn with_path_resolution(base_vertex: &str, base_fragment: &str) -> Self {
        let shader_dirs = ["shaders/", "resources/shaders/", "../shaders/", "./"];

        let find = |name: &str| {
            shader_dirs
                .iter()
                .map(|dir| format!("{}{}", dir, name))
                .find(|candidate| Path::new(candidate).exists())
                .unwrap_or_else(|| format!("shaders/{}", name))
        };

        Self {
            vertex_shader_path: find(base_vertex),
            fragment_shader_path: find(base_fragment),
        }
    }

    /// Validate that both paths are set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vertex_shader_path.is_empty() {
            return Err(ConfigError::Invalid("Vertex shader path cannot be empty".to_string()));
        }
        if self.fragment_shader_path.is_empty() {
            return Err(ConfigError::Invalid("Fragment shader path cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self::with_path_resolution("sprite.vert", "sprite.frag")
    }
}

/// # Renderer Configuration
///
/// Settings for the sprite renderer and its worker thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Width of the virtual (design) resolution
    pub virtual_width: u32,
    /// Height of the virtual (design) resolution
    pub virtual_height: u32,
    /// Initial window width in pixels
    pub screen_width: u32,
    /// Initial window height in pixels
    pub screen_height: u32,
    /// Shader configuration
    pub shaders: ShaderConfig,
    /// Colour the backbuffer is cleared to at the start of every frame
    pub clear_color: [f32; 4],
    /// Number of sprite slots in pools created from this config
    pub sprite_pool_capacity: usize,
    /// Keep CPU pixel data after a texture has been uploaded
    pub keep_pixels_after_upload: bool,
    /// Name given to the render worker thread
    pub worker_thread_name: String,
}

impl RendererConfig {
    /// Create a renderer configuration for a virtual resolution
    pub fn new(virtual_width: u32, virtual_height: u32) -> Self {
        Self {
            virtual_width,
            virtual_height,
            screen_width: virtual_width,
            screen_height: virtual_height,
            shaders: ShaderConfig::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            sprite_pool_capacity: DEFAULT_SPRITE_POOL_CAPACITY,
            keep_pixels_after_upload: false,
            worker_thread_name: "render_thread".to_string(),
        }
    }

    /// Set the initial screen size
    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    /// Set custom shader configuration
    pub fn with_shaders(mut self, shaders: ShaderConfig) -> Self {
        self.shaders = shaders;
        self
    }

    /// Set the clear colour
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Set the sprite pool capacity
    pub fn with_sprite_pool_capacity(mut self, capacity: usize) -> Self {
        self.sprite_pool_capacity = capacity;
        self
    }

    /// Keep or release CPU pixel data once uploaded
    pub fn with_keep_pixels(mut self, keep: bool) -> Self {
        self.keep_pixels_after_upload = keep;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.virtual_width == 0 || self.virtual_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "Virtual resolution must be non-zero, got {}x{}",
                self.virtual_width, self.virtual_height
            )));
        }

        if self.sprite_pool_capacity == 0 {
            return Err(ConfigError::Invalid("Sprite pool capacity must be at least 1".to_string()));
        }
        if self.sprite_pool_capacity > MAX_SPRITE_POOL_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "Sprite pool capacity {} exceeds the maximum of {}",
                self.sprite_pool_capacity, MAX_SPRITE_POOL_CAPACITY
            )));
        }

        if self.worker_thread_name.is_empty() {
            return Err(ConfigError::Invalid("Worker thread name cannot be empty".to_string()));
        }

        self.shaders.validate()
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new(320, 180).with_screen_size(1280, 720)
    }
}

/// # Engine Configuration
///
/// Core engine behavior shared by every subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Parse the configured log level, defaulting to `Info` when unrecognised
    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or_else(|_| {
            log::warn!("Unknown log level '{}', using info", self.log_level);
            log::LevelFilter::Info
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Asset Configuration
///
/// Limits and search location for the texture asset table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Base directory for assets
    pub assets_dir: String,
    /// Maximum number of textures loaded at once
    pub max_textures: usize,
}

impl AssetConfig {
    /// Create a new asset configuration
    pub fn new() -> Self {
        Self {
            assets_dir: "resources".to_string(),
            max_textures: DEFAULT_MAX_TEXTURES,
        }
    }

    /// Set assets directory
    pub fn with_assets_dir(mut self, dir: impl Into<String>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    /// Set the texture table capacity
    pub fn with_max_textures(mut self, max_textures: usize) -> Self {
        self.max_textures = max_textures;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_textures == 0 {
            return Err(ConfigError::Invalid("Texture table needs at least one slot".to_string()));
        }
        Ok(())
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
/// This is the main configuration structure applications should use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Rendering system configuration
    pub renderer: RendererConfig,
    /// Asset system configuration
    pub assets: AssetConfig,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.renderer.validate()?;
        self.assets.validate()?;
        Ok(())
    }
}

impl Config for ApplicationConfig {}
