//! Texture atlas for sprite rendering
//!
//! An atlas pairs one texture with an ordered list of named sub-rectangles.
//! Sprites are instantiated from an atlas by name or by index; the texture
//! and rectangle are fixed at that point.
//!
//! Atlases can be described in TOML or RON through [`AtlasDescriptor`]:
//!
//! ```toml
//! texture = "sprites/hero.png"
//!
//! [[entries]]
//! name = "idle"
//! rect = { x = 0.0, y = 0.0, w = 16.0, h = 16.0 }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::render::primitives::{Placement, Rect, Sprite};
use crate::render::resources::texture::Texture;

/// Result type for atlas operations
pub type AtlasResult<T> = Result<T, AtlasError>;

/// Errors that can occur during atlas construction and lookup
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum AtlasError {
    /// No entry has the requested name
    #[error("Sprite '{0}' not found in atlas")]
    NotFound(String),

    /// Index past the end of the entry list
    #[error("Sprite index {index} out of range (atlas has {len} entries)")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of entries
        len: usize,
    },

    /// Two entries share a name
    #[error("Duplicate sprite name '{0}'")]
    DuplicateName(String),

    /// Entry with an empty name
    #[error("Sprite name at index {0} is empty")]
    EmptyName(usize),

    /// Rectangle is negative or falls outside the texture
    #[error("Sprite '{name}' has rectangle {rect:?} outside the {width}x{height} texture")]
    InvalidRect {
        /// Entry name
        name: String,
        /// Offending rectangle
        rect: Rect,
        /// Texture width
        width: u32,
        /// Texture height
        height: u32,
    },
}

/// Reference to an atlas entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteRef<'a> {
    /// By name
    Name(&'a str),
    /// By position in the entry list
    Index(usize),
}

impl<'a> From<&'a str> for SpriteRef<'a> {
    fn from(name: &'a str) -> Self {
        SpriteRef::Name(name)
    }
}

impl From<usize> for SpriteRef<'_> {
    fn from(index: usize) -> Self {
        SpriteRef::Index(index)
    }
}

/// One named sub-rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasEntry {
    /// Unique name
    pub name: String,
    /// Region in texture pixels; zero means the whole texture
    pub rect: Rect,
}

impl AtlasEntry {
    /// Create an entry
    pub fn new(name: impl Into<String>, rect: Rect) -> Self {
        Self { name: name.into(), rect }
    }
}

/// Serializable atlas description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AtlasDescriptor {
    /// Path of the atlas texture, relative to the assets directory
    pub texture: String,
    /// Entries in index order
    pub entries: Vec<AtlasEntry>,
}

impl Config for AtlasDescriptor {}

/// Texture plus named sub-rectangles
#[derive(Debug, Clone)]
pub struct TextureAtlas {
    texture: Arc<Texture>,
    entries: Vec<AtlasEntry>,
    by_name: HashMap<String, usize>,
}

impl TextureAtlas {
    /// Build an atlas, rejecting empty or duplicate names and bad rectangles
    pub fn new(
        texture: Arc<Texture>,
        entries: impl IntoIterator<Item = AtlasEntry>,
    ) -> AtlasResult<Self> {
        let (width, height) = (texture.width(), texture.height());
        let mut resolved = Vec::new();
        let mut by_name = HashMap::new();

        for (index, entry) in entries.into_iter().enumerate() {
            if entry.name.is_empty() {
                return Err(AtlasError::EmptyName(index));
            }

            let rect = entry.rect.resolve(width, height);
            let fits = rect.x >= 0.0
                && rect.y >= 0.0
                && rect.w > 0.0
                && rect.h > 0.0
                && rect.x + rect.w <= width as f32
                && rect.y + rect.h <= height as f32;
            if !fits {
                return Err(AtlasError::InvalidRect {
                    name: entry.name,
                    rect: entry.rect,
                    width,
                    height,
                });
            }

            if by_name.insert(entry.name.clone(), index).is_some() {
                return Err(AtlasError::DuplicateName(entry.name));
            }
            resolved.push(AtlasEntry { name: entry.name, rect });
        }

        log::debug!("Built atlas over texture {} with {} entries", texture.id(), resolved.len());

        Ok(Self {
            texture,
            entries: resolved,
            by_name,
        })
    }

    /// Build an atlas from a descriptor; the descriptor's texture path is not loaded here
    pub fn from_descriptor(
        texture: Arc<Texture>,
        descriptor: &AtlasDescriptor,
    ) -> AtlasResult<Self> {
        Self::new(texture, descriptor.entries.iter().cloned())
    }

    /// Index of the entry with this name
    pub fn lookup_by_name(&self, name: &str) -> AtlasResult<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| AtlasError::NotFound(name.to_string()))
    }

    /// Rectangle at this index
    pub fn lookup_by_index(&self, index: usize) -> AtlasResult<Rect> {
        self.entries
            .get(index)
            .map(|entry| entry.rect)
            .ok_or(AtlasError::OutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Name at this index
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.name.as_str())
    }

    /// Resolve a reference to an index
    pub fn resolve(&self, sprite: SpriteRef<'_>) -> AtlasResult<usize> {
        match sprite {
            SpriteRef::Name(name) => self.lookup_by_name(name),
            SpriteRef::Index(index) if index < self.entries.len() => Ok(index),
            SpriteRef::Index(index) => Err(AtlasError::OutOfRange {
                index,
                len: self.entries.len(),
            }),
        }
    }

    /// Create a sprite from an entry
    pub fn instantiate<'a>(
        &self,
        sprite: impl Into<SpriteRef<'a>>,
        placement: Placement,
    ) -> AtlasResult<Sprite> {
        let index = self.resolve(sprite.into())?;
        Ok(Sprite::new(Arc::clone(&self.texture), self.entries[index].rect, placement))
    }

    /// Atlas texture
    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the atlas has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in index order
    pub fn entries(&self) -> &[AtlasEntry] {
        &self.entries
    }
}
