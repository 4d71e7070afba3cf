//! # Texture Asset Table
//!
//! Reference-counted, path-keyed table of loaded textures.
//!
//! ## Lifecycle
//!
//! 1. `acquire(path)` returns a [`TextureLease`]. The first lease for a path
//!    decodes the image; later leases share the same [`Texture`].
//! 2. Each lease clone counts as one more user; each drop as one fewer.
//! 3. When the last lease drops the texture is removed from the table and
//!    queued as *retired*. Its slot is free for a new texture immediately.
//! 4. After each frame the render worker deletes the GPU copies of retired
//!    textures that no sprite still references, on the thread that owns the
//!    graphics context. Textures still referenced stay queued.
//!
//! The table is an explicit value, cheap to clone, and shared between the
//! game code that acquires textures and the renderer that retires them.

use std::collections::HashMap;
use std::ops::Deref;
use std::path::Path;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::assets::{AssetError, AssetResult, ImageData};
use crate::config::Config;
use crate::core::config::AssetConfig;
use crate::foundation::collections::{path_hash, HandleMap, TextureKey};
use crate::render::resources::texture::{Texture, TextureId};
use crate::render::systems::atlas::{AtlasDescriptor, TextureAtlas};

#[derive(Debug)]
struct TextureEntry {
    path: String,
    texture: Arc<Texture>,
    ref_count: usize,
}

#[derive(Debug)]
struct AssetTable {
    config: AssetConfig,
    entries: HandleMap<TextureKey, TextureEntry>,
    by_path: HashMap<u64, TextureKey>,
    retired: Vec<Arc<Texture>>,
    next_id: TextureId,
}

impl AssetTable {
    fn find(&self, path: &str) -> AssetResult<Option<TextureKey>> {
        let Some(&key) = self.by_path.get(&path_hash(path)) else {
            return Ok(None);
        };
        match self.entries.get(key) {
            Some(entry) if entry.path == path => Ok(Some(key)),
            Some(entry) => Err(AssetError::PathCollision {
                path: path.to_string(),
                existing: entry.path.clone(),
            }),
            None => Ok(None),
        }
    }

    fn retain(&mut self, key: TextureKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.ref_count += 1;
        }
    }

    fn release(&mut self, key: TextureKey) {
        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };
        entry.ref_count -= 1;
        if entry.ref_count > 0 {
            return;
        }

        if let Some(entry) = self.entries.remove(key) {
            self.by_path.remove(&path_hash(&entry.path));
            log::debug!("Retiring texture {} '{}'", entry.texture.id(), entry.path);
            self.retired.push(entry.texture);
        }
    }
}

/// Shared texture table
#[derive(Debug, Clone)]
pub struct TextureAssets {
    table: Arc<Mutex<AssetTable>>,
}

impl TextureAssets {
    /// Create an empty table
    pub fn new(config: AssetConfig) -> Self {
        log::info!(
            "Texture table ready: {} slots, assets in '{}'",
            config.max_textures,
            config.assets_dir
        );
        Self {
            table: Arc::new(Mutex::new(AssetTable {
                config,
                entries: HandleMap::with_key(),
                by_path: HashMap::new(),
                retired: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Acquire a texture file, relative to the assets directory
    pub fn acquire(&self, path: &str) -> AssetResult<TextureLease> {
        let full_path = Path::new(&self.table.lock().config.assets_dir).join(path);
        self.acquire_with(path, || {
            if !full_path.exists() {
                return Err(AssetError::NotFound(full_path.display().to_string()));
            }
            ImageData::from_file(&full_path)
        })
    }

    /// Acquire a texture by name, producing its pixels with `load` on first use
    ///
    /// `load` only runs when the name is not already in the table.
    pub fn acquire_with(
        &self,
        path: &str,
        load: impl FnOnce() -> AssetResult<ImageData>,
    ) -> AssetResult<TextureLease> {
        let mut table = self.table.lock();

        if let Some(key) = table.find(path)? {
            table.retain(key);
            let texture = Arc::clone(&table.entries[key].texture);
            return Ok(self.lease(key, texture));
        }

        let capacity = table.config.max_textures;
        if table.entries.len() >= capacity {
            log::warn!("Cannot load '{}': texture table full ({} slots)", path, capacity);
            return Err(AssetError::CapacityExhausted { capacity });
        }

        let image = load()?;
        let id = table.next_id;
        table.next_id = table.next_id.wrapping_add(1);

        let texture = Arc::new(Texture::new(id, path, image));
        let key = table.entries.insert(TextureEntry {
            path: path.to_string(),
            texture: Arc::clone(&texture),
            ref_count: 1,
        });
        table.by_path.insert(path_hash(path), key);

        log::info!("Loaded texture {} '{}' ({}x{})", id, path, texture.width(), texture.height());
        Ok(self.lease(key, texture))
    }

    /// Load an atlas descriptor (TOML or RON) and the texture it names
    pub fn load_atlas(&self, descriptor_path: impl AsRef<Path>) -> AssetResult<LoadedAtlas> {
        let descriptor = AtlasDescriptor::load_from_file(descriptor_path)?;
        let lease = self.acquire(&descriptor.texture)?;
        let atlas = TextureAtlas::from_descriptor(Arc::clone(lease.texture()), &descriptor)?;
        Ok(LoadedAtlas { lease, atlas })
    }

    fn lease(&self, key: TextureKey, texture: Arc<Texture>) -> TextureLease {
        TextureLease {
            key,
            texture,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Loaded texture for a path, without taking a reference
    pub fn get(&self, path: &str) -> Option<Arc<Texture>> {
        let table = self.table.lock();
        let key = table.find(path).ok().flatten()?;
        Some(Arc::clone(&table.entries[key].texture))
    }

    /// Number of live leases for a path
    pub fn ref_count(&self, path: &str) -> usize {
        let table = self.table.lock();
        match table.find(path) {
            Ok(Some(key)) => table.entries[key].ref_count,
            _ => 0,
        }
    }

    /// Number of textures currently loaded
    pub fn loaded_count(&self) -> usize {
        self.table.lock().entries.len()
    }

    /// Maximum number of textures loaded at once
    pub fn capacity(&self) -> usize {
        self.table.lock().config.max_textures
    }

    /// Take every texture retired since the last call
    pub fn take_retired(&self) -> Vec<Arc<Texture>> {
        std::mem::take(&mut self.table.lock().retired)
    }

    /// Take the retired textures nothing outside the queue references
    ///
    /// Retired textures still held by sprites or leases stay queued.
    pub fn take_unreferenced_retired(&self) -> Vec<Arc<Texture>> {
        let mut table = self.table.lock();
        let (unreferenced, held): (Vec<_>, Vec<_>) = std::mem::take(&mut table.retired)
            .into_iter()
            .partition(|texture| Arc::strong_count(texture) == 1);
        table.retired = held;
        unreferenced
    }

    /// Retire every loaded texture
    ///
    /// Outstanding leases stay usable but no longer count toward anything.
    pub fn reset(&self) {
        let mut table = self.table.lock();
        let entries = std::mem::take(&mut table.entries);
        table.by_path.clear();
        let count = entries.len();
        table.retired.extend(entries.into_iter().map(|(_, entry)| entry.texture));
        log::info!("Texture table reset, {} textures retired", count);
    }
}

/// A counted reference to a loaded texture
///
/// Dropping the last lease for a texture retires it.
#[derive(Debug)]
pub struct TextureLease {
    key: TextureKey,
    texture: Arc<Texture>,
    table: Weak<Mutex<AssetTable>>,
}

impl TextureLease {
    /// The shared texture
    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }
}

impl Deref for TextureLease {
    type Target = Texture;

    fn deref(&self) -> &Texture {
        &self.texture
    }
}

impl Clone for TextureLease {
    fn clone(&self) -> Self {
        if let Some(table) = self.table.upgrade() {
            table.lock().retain(self.key);
        }
        Self {
            key: self.key,
            texture: Arc::clone(&self.texture),
            table: Weak::clone(&self.table),
        }
    }
}

impl Drop for TextureLease {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.lock().release(self.key);
        }
    }
}

/// An atlas together with the lease that keeps its texture loaded
#[derive(Debug)]
pub struct LoadedAtlas {
    /// Lease on the atlas texture
    pub lease: TextureLease,
    /// The atlas
    pub atlas: TextureAtlas,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::primitives::Rect;
    use crate::render::systems::atlas::AtlasEntry;

    fn assets(max_textures: usize) -> TextureAssets {
        TextureAssets::new(AssetConfig::new().with_max_textures(max_textures))
    }

    fn white() -> AssetResult<ImageData> {
        Ok(ImageData::solid_color(4, 4, [255; 4]))
    }

    #[test]
    fn test_same_path_shares_texture() {
        let assets = assets(4);
        let a = assets.acquire_with("hero", white).expect("load");
        let b = assets
            .acquire_with("hero", || panic!("second acquire must not reload"))
            .expect("cached");

        assert!(Arc::ptr_eq(a.texture(), b.texture()));
        assert_eq!(assets.ref_count("hero"), 2);
        assert_eq!(assets.loaded_count(), 1);
    }

    #[test]
    fn test_last_drop_retires_texture() {
        let assets = assets(4);
        let a = assets.acquire_with("hero", white).expect("load");
        let b = a.clone();
        assert_eq!(assets.ref_count("hero"), 2);

        drop(a);
        assert_eq!(assets.ref_count("hero"), 1);
        assert!(assets.take_retired().is_empty());

        let id = b.id();
        drop(b);
        assert_eq!(assets.loaded_count(), 0);
        let retired = assets.take_retired();
        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].id(), id);
        assert!(assets.take_retired().is_empty());
    }

    #[test]
    fn test_retired_texture_held_by_sprite_stays_queued() {
        let assets = assets(4);
        let lease = assets.acquire_with("hero", white).expect("load");
        let held = Arc::clone(lease.texture());
        drop(lease);

        assert!(assets.take_unreferenced_retired().is_empty());

        drop(held);
        let retired = assets.take_unreferenced_retired();
        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].label(), "hero");
        assert!(assets.take_retired().is_empty());
    }

    #[test]
    fn test_full_table_rejects_new_paths() {
        let assets = assets(2);
        let _a = assets.acquire_with("a", white).expect("a");
        let b = assets.acquire_with("b", white).expect("b");

        assert!(matches!(
            assets.acquire_with("c", white),
            Err(AssetError::CapacityExhausted { capacity: 2 })
        ));
        // Re-acquiring a loaded path still works when full
        assert!(assets.acquire_with("a", white).is_ok());

        drop(b);
        assert!(assets.acquire_with("c", white).is_ok());
    }

    #[test]
    fn test_reloaded_path_gets_fresh_id() {
        let assets = assets(2);
        let first = assets.acquire_with("hero", white).expect("load");
        let first_id = first.id();
        drop(first);

        let second = assets.acquire_with("hero", white).expect("reload");
        assert_ne!(second.id(), first_id);
    }

    #[test]
    fn test_failed_load_leaves_table_unchanged() {
        let assets = assets(2);
        let result =
            assets.acquire_with("broken", || Err(AssetError::LoadFailed("bad png".to_string())));
        assert!(matches!(result, Err(AssetError::LoadFailed(_))));
        assert_eq!(assets.loaded_count(), 0);
        assert!(assets.get("broken").is_none());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let assets = TextureAssets::new(AssetConfig::new().with_assets_dir("no/such/dir"));
        assert!(matches!(assets.acquire("hero.png"), Err(AssetError::NotFound(_))));
    }

    #[test]
    fn test_reset_retires_everything() {
        let assets = assets(4);
        let a = assets.acquire_with("a", white).expect("a");
        let _b = assets.acquire_with("b", white).expect("b");

        assets.reset();
        assert_eq!(assets.loaded_count(), 0);
        assert_eq!(assets.take_retired().len(), 2);

        // Dropping a lease from before the reset is harmless
        drop(a);
        assert!(assets.take_retired().is_empty());
    }

    #[test]
    fn test_lease_outlives_table() {
        let lease = {
            let assets = assets(1);
            assets.acquire_with("orphan", white).expect("load")
        };
        assert_eq!(lease.width(), 4);
        let copy = lease.clone();
        drop(lease);
        assert_eq!(copy.label(), "orphan");
    }

    #[test]
    fn test_load_atlas_from_descriptor_file() {
        let dir = std::env::temp_dir().join(format!("sprite_engine_atlas_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");

        let image = image::RgbaImage::from_pixel(32, 16, image::Rgba([255, 0, 0, 255]));
        image.save(dir.join("sheet.png")).expect("write png");

        let descriptor = AtlasDescriptor {
            texture: "sheet.png".to_string(),
            entries: vec![
                AtlasEntry::new("left", Rect::new(0.0, 0.0, 16.0, 16.0)),
                AtlasEntry::new("right", Rect::new(16.0, 0.0, 16.0, 16.0)),
            ],
        };
        let descriptor_path = dir.join("sheet.ron");
        descriptor.save_to_file(&descriptor_path).expect("write descriptor");

        let assets =
            TextureAssets::new(AssetConfig::new().with_assets_dir(dir.display().to_string()));
        let loaded = assets.load_atlas(&descriptor_path).expect("atlas loads");
        assert_eq!(loaded.atlas.len(), 2);
        assert_eq!(loaded.atlas.lookup_by_name("right"), Ok(1));
        assert_eq!(loaded.lease.width(), 32);
        assert_eq!(assets.ref_count("sheet.png"), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
