//! Item catalog loaded from JSON item packs.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::item::{IconHandle, Item};
use crate::key::{ItemKey, ItemKeyError};

/// Item definition as authored in an item pack.
#[derive(Debug, Deserialize)]
pub struct ItemDefinition {
    /// Catalog key (e.g., "bolt" or "bunker:bolt").
    pub key: String,
    /// Human-readable name shown in alerts and listings.
    pub name: String,
    /// Icon asset path (defaults to `icons/<path>.png`).
    #[serde(default)]
    pub icon: Option<String>,
    /// Per-item stack cap; 0 leaves the cap to the container.
    #[serde(default)]
    pub stack_cap: u32,
}

/// Errors emitted while loading an item pack.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Wrap IO errors when reading packs.
    #[error("failed to read item pack: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse item pack: {0}")]
    Parse(#[from] serde_json::Error),
    /// An entry carried a malformed key.
    #[error("invalid item key `{key}`: {source}")]
    InvalidKey {
        /// Offending key as written.
        key: String,
        /// Validation failure.
        source: ItemKeyError,
    },
    /// Two entries resolved to the same key.
    #[error("duplicate item key `{0}`")]
    Duplicate(ItemKey),
}

/// Read-only set of item definitions, indexed by key.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Arc<Item>>,
    key_to_index: HashMap<ItemKey, usize>,
}

impl ItemCatalog {
    /// Build a catalog from already-constructed items.
    pub fn new(items: Vec<Item>) -> Result<Self, CatalogError> {
        let mut key_to_index = HashMap::with_capacity(items.len());
        let mut stored = Vec::with_capacity(items.len());
        for item in items {
            if key_to_index.contains_key(item.key()) {
                return Err(CatalogError::Duplicate(item.key().clone()));
            }
            key_to_index.insert(item.key().clone(), stored.len());
            stored.push(Arc::new(item));
        }
        Ok(Self {
            items: stored,
            key_to_index,
        })
    }

    /// Look up an item by bare or namespaced key.
    pub fn get(&self, key: &str) -> Option<&Arc<Item>> {
        let key = ItemKey::parse(key).ok()?;
        self.get_by_key(&key)
    }

    /// Look up an item by parsed key.
    pub fn get_by_key(&self, key: &ItemKey) -> Option<&Arc<Item>> {
        self.key_to_index.get(key).map(|&idx| &self.items[idx])
    }

    /// Find an item by display name, ignoring ASCII case.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<Item>> {
        self.items
            .iter()
            .find(|item| item.name().eq_ignore_ascii_case(name))
    }

    /// Iterate items in pack order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Item>> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Load a catalog from the provided JSON file path.
pub fn catalog_from_file(path: &Path) -> Result<ItemCatalog, CatalogError> {
    let data = fs::read_to_string(path)?;
    catalog_from_str(&data)
}

/// Load a catalog from an in-memory JSON string.
pub fn catalog_from_str(input: &str) -> Result<ItemCatalog, CatalogError> {
    let defs: Vec<ItemDefinition> = serde_json::from_str(input)?;
    let mut items = Vec::with_capacity(defs.len());
    for def in defs {
        let key = ItemKey::parse(&def.key).map_err(|source| CatalogError::InvalidKey {
            key: def.key.clone(),
            source,
        })?;
        let icon = def
            .icon
            .unwrap_or_else(|| format!("icons/{}.png", key.path()));
        items.push(Item::new(key, def.name, IconHandle::new(icon), def.stack_cap));
    }
    ItemCatalog::new(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACK: &str = r#"
    [
      { "key": "bolt", "name": "Bolt", "stack_cap": 16 },
      { "key": "bunker:wire", "name": "Wire", "icon": "ui/wire.png" },
      { "key": "filter", "name": "Air Filter", "stack_cap": 1 }
    ]
    "#;

    #[test]
    fn loads_pack_with_defaults() {
        let catalog = catalog_from_str(PACK).expect("valid pack");
        assert_eq!(catalog.len(), 3);

        let bolt = catalog.get("bolt").expect("bolt");
        assert_eq!(bolt.name(), "Bolt");
        assert_eq!(bolt.stack_cap(), 16);
        assert_eq!(bolt.icon().as_str(), "icons/bolt.png");

        let wire = catalog.get("bunker:wire").expect("wire");
        assert_eq!(wire.stack_cap(), 0);
        assert_eq!(wire.icon().as_str(), "ui/wire.png");
        assert_eq!(catalog.get("wire"), Some(wire));
    }

    #[test]
    fn finds_by_display_name() {
        let catalog = catalog_from_str(PACK).unwrap();
        let filter = catalog.find_by_name("air filter").expect("filter");
        assert_eq!(filter.key().path(), "filter");
        assert!(catalog.find_by_name("rope").is_none());
    }

    #[test]
    fn rejects_duplicates_and_bad_keys() {
        let dup = r#"[{ "key": "bolt", "name": "A" }, { "key": "bunker:bolt", "name": "B" }]"#;
        assert!(matches!(
            catalog_from_str(dup),
            Err(CatalogError::Duplicate(_))
        ));

        let bad = r#"[{ "key": "Bolt!", "name": "A" }]"#;
        assert!(matches!(
            catalog_from_str(bad),
            Err(CatalogError::InvalidKey { .. })
        ));

        assert!(matches!(
            catalog_from_str("{"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn unknown_or_malformed_lookup_is_none() {
        let catalog = catalog_from_str(PACK).unwrap();
        assert!(catalog.get("rope").is_none());
        assert!(catalog.get("NOT VALID").is_none());
    }
}
