//! # Core Engine Module
//!
//! Shared abstractions used throughout the engine.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for renderer, assets and engine behavior

pub mod config;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    EngineConfig,
    RendererConfig,
    ShaderConfig,
    AssetConfig,
    Config,
    ConfigError,
};
