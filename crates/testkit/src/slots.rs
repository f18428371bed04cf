//! Serializable views of inventory contents for snapshots.

use bunker_core::ItemStack;
use serde::Serialize;

/// One occupied slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    /// Slot index.
    pub slot: usize,
    /// Namespaced item key.
    pub item: String,
    /// Stack size.
    pub count: u32,
}

/// Occupied slots of one inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryView {
    /// Inventory name.
    pub name: String,
    /// Total slot count.
    pub size: usize,
    /// Non-empty slots in index order.
    pub slots: Vec<SlotView>,
}

impl InventoryView {
    /// Capture `slots`, skipping empty ones.
    pub fn capture<'a, I>(name: impl Into<String>, slots: I) -> Self
    where
        I: IntoIterator<Item = &'a ItemStack>,
    {
        let mut size = 0;
        let mut occupied = Vec::new();
        for (slot, stack) in slots.into_iter().enumerate() {
            size += 1;
            if let Some(item) = stack.item() {
                occupied.push(SlotView {
                    slot,
                    item: item.key().to_string(),
                    count: stack.count(),
                });
            }
        }
        Self {
            name: name.into(),
            size,
            slots: occupied,
        }
    }

    /// Sum of every slot's count.
    pub fn total(&self) -> u64 {
        self.slots.iter().map(|s| u64::from(s.count)).sum()
    }
}

/// Compact `Item xN` rendering for a stack (`-` when empty).
pub fn stack_label(stack: &ItemStack) -> String {
    match stack.item() {
        Some(item) => format!("{} x{}", item.key(), stack.count()),
        None => "-".to_string(),
    }
}
