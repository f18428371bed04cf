//! Shared test fixtures.

use bunker_core::{catalog_from_str, ItemCatalog, ItemStack};

/// Item pack used across test suites.
///
/// Caps: bolt 16, wire unbounded, duct tape 8, air filter 1, battery 4,
/// scrap unbounded.
pub const SAMPLE_ITEMS: &str = r#"[
  { "key": "bolt", "name": "Bolt", "stack_cap": 16 },
  { "key": "wire", "name": "Wire" },
  { "key": "duct_tape", "name": "Duct Tape", "stack_cap": 8 },
  { "key": "air_filter", "name": "Air Filter", "stack_cap": 1 },
  { "key": "battery", "name": "Battery", "stack_cap": 4 },
  { "key": "scrap", "name": "Scrap Metal" }
]"#;

/// Parse [`SAMPLE_ITEMS`].
pub fn sample_catalog() -> ItemCatalog {
    catalog_from_str(SAMPLE_ITEMS).expect("sample item pack is valid")
}

/// Build a stack of `key` from `catalog`.
///
/// # Panics
/// Panics when the key is unknown; fixtures are expected to be consistent.
pub fn stack_of(catalog: &ItemCatalog, key: &str, count: u32) -> ItemStack {
    let item = catalog
        .get(key)
        .unwrap_or_else(|| panic!("fixture item `{key}` missing from catalog"));
    ItemStack::new(item.clone(), count)
}
