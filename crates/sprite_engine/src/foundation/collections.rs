//! Specialized collection types

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable key into the texture asset table
    pub struct TextureKey;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;

/// Stable 64-bit hash of an asset path, used as a lookup key
///
/// FNV-1a, stable across runs
pub fn path_hash(path: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    path.bytes().fold(OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_hash_is_deterministic() {
        assert_eq!(path_hash("textures/hero.png"), path_hash("textures/hero.png"));
        assert_ne!(path_hash("textures/hero.png"), path_hash("textures/hero2.png"));
    }

    #[test]
    fn test_empty_path_hash_is_offset_basis() {
        assert_eq!(path_hash(""), 0xcbf2_9ce4_8422_2325);
    }

    #[test]
    fn test_handle_map_keys_are_stable() {
        let mut map: HandleMap<TextureKey, &str> = HandleMap::with_key();
        let a = map.insert("a");
        let b = map.insert("b");
        map.remove(a);
        assert_eq!(map.get(b), Some(&"b"));
        assert!(map.get(a).is_none());
    }
}
