#![warn(missing_docs)]
//! Item primitives shared across the workspace: keys, item definitions,
//! stacks and the catalog they are loaded into.

pub mod catalog;
pub mod item;
pub mod key;

pub use catalog::{catalog_from_file, catalog_from_str, CatalogError, ItemCatalog, ItemDefinition};
pub use item::{IconHandle, Item, ItemStack};
pub use key::{ItemKey, ItemKeyError};
