//! Item definitions and the stacks that reference them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::key::ItemKey;

/// Opaque reference to an item's icon asset.
///
/// The engine never resolves it; presentation layers map it to a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconHandle(String);

impl IconHandle {
    /// Wrap an asset path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The wrapped asset path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Immutable item definition owned by the [`crate::ItemCatalog`].
///
/// Two items are equal iff every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    key: ItemKey,
    name: String,
    icon: IconHandle,
    stack_cap: u32,
}

impl Item {
    /// Create a new item definition. A `stack_cap` of 0 means the item
    /// imposes no cap of its own.
    pub fn new(key: ItemKey, name: impl Into<String>, icon: IconHandle, stack_cap: u32) -> Self {
        Self {
            key,
            name: name.into(),
            icon,
            stack_cap,
        }
    }

    /// Catalog key.
    pub fn key(&self) -> &ItemKey {
        &self.key
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Icon reference.
    pub fn icon(&self) -> &IconHandle {
        &self.icon
    }

    /// Per-item stack cap (0 = uncapped).
    pub fn stack_cap(&self) -> u32 {
        self.stack_cap
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A quantity of one item held together as a unit.
///
/// `count == 0` iff there is no item; the constructors normalise any
/// zero-count stack to [`ItemStack::empty`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemStack {
    item: Option<Arc<Item>>,
    count: u32,
}

impl ItemStack {
    /// The canonical empty stack.
    pub const fn empty() -> Self {
        Self {
            item: None,
            count: 0,
        }
    }

    /// Create a stack of `count` items.
    pub fn new(item: Arc<Item>, count: u32) -> Self {
        if count == 0 {
            return Self::empty();
        }
        Self {
            item: Some(item),
            count,
        }
    }

    /// Create a stack from an optional item; an absent item always yields the
    /// empty stack.
    pub fn from_parts(item: Option<Arc<Item>>, count: u32) -> Self {
        match item {
            Some(item) => Self::new(item, count),
            None => Self::empty(),
        }
    }

    /// The referenced item, if any.
    pub fn item(&self) -> Option<&Arc<Item>> {
        self.item.as_ref()
    }

    /// Number of items in the stack.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether the stack holds nothing.
    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    /// A fresh stack of the same item with a different count.
    pub fn with_count(&self, count: u32) -> Self {
        Self::from_parts(self.item.clone(), count)
    }

    /// Whether both stacks hold the same (non-absent) item.
    pub fn same_item(&self, other: &ItemStack) -> bool {
        match (&self.item, &other.item) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Whether this stack holds `item`.
    pub fn holds(&self, item: &Item) -> bool {
        self.item.as_deref() == Some(item)
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.item {
            Some(item) => write!(f, "{} x{}", item.name(), self.count),
            None => f.write_str("(empty)"),
        }
    }
}
