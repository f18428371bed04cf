//! Fixed-capacity slot inventory.
//!
//! Slots are addressed by index and never resize. Each slot holds one
//! [`ItemStack`] bounded by the effective stack limit of its item, and an
//! optional whitelist restricts which items the container accepts at all.

use std::sync::Arc;

use bunker_core::{Item, ItemStack};

use crate::container::Container;

/// Stack limit used when neither the item nor the container caps a slot.
pub const UNBOUNDED_STACK: u32 = u32::MAX;

/// Resolve the per-slot cap from an item cap and a container cap.
///
/// Caps of 0 mean "no cap". When both are set the smaller one wins; when
/// neither is set the slot is unbounded.
pub fn effective_stack_limit(item_cap: u32, slot_cap: u32) -> u32 {
    match (item_cap, slot_cap) {
        (0, 0) => UNBOUNDED_STACK,
        (0, cap) | (cap, 0) => cap,
        (a, b) => a.min(b),
    }
}

/// Ordered, fixed-length slot storage with a container-wide cap and whitelist.
#[derive(Debug, Clone)]
pub struct Inventory {
    name: String,
    slots: Vec<ItemStack>,
    slot_stack_cap: u32,
    whitelist: Vec<Arc<Item>>,
    changed: bool,
    revision: u64,
}

impl Inventory {
    /// Create an inventory with `capacity` empty slots.
    ///
    /// An empty `whitelist` accepts every item.
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
        slot_stack_cap: u32,
        whitelist: Vec<Arc<Item>>,
    ) -> Self {
        Self {
            name: name.into(),
            slots: vec![ItemStack::empty(); capacity],
            slot_stack_cap,
            whitelist,
            changed: false,
            revision: 0,
        }
    }

    /// Discard all contents and rebuild the slot layout.
    ///
    /// Returns whatever the slots held before.
    pub(crate) fn reconfigure(
        &mut self,
        capacity: usize,
        slot_stack_cap: u32,
        whitelist: Vec<Arc<Item>>,
    ) -> Vec<ItemStack> {
        let previous = std::mem::replace(&mut self.slots, vec![ItemStack::empty(); capacity]);
        self.slot_stack_cap = slot_stack_cap;
        self.whitelist = whitelist;
        self.mark_changed();
        previous.into_iter().filter(|s| !s.is_empty()).collect()
    }

    /// Items this container is restricted to (empty = everything).
    pub fn whitelist(&self) -> &[Arc<Item>] {
        &self.whitelist
    }

    /// Read-only view of the slot sequence.
    pub fn as_slice(&self) -> &[ItemStack] {
        &self.slots
    }

    fn mark_changed(&mut self) {
        self.changed = true;
        self.revision += 1;
    }

    fn write(&mut self, index: usize, stack: ItemStack) {
        self.slots[index] = stack;
        self.mark_changed();
    }

    /// `set_slot` for totals that may exceed `u32`; the overflow joins the
    /// remainder.
    fn set_slot_total(&mut self, index: usize, item: &Arc<Item>, total: u64) -> u64 {
        let clamped = u32::try_from(total).unwrap_or(u32::MAX);
        let overflow = total - u64::from(clamped);
        u64::from(self.set_slot(index, ItemStack::new(Arc::clone(item), clamped))) + overflow
    }
}

impl Container for Inventory {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.slots.len()
    }

    fn stack(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index)
    }

    fn slot_stack_cap(&self) -> u32 {
        self.slot_stack_cap
    }

    fn accepts(&self, item: &Item) -> bool {
        self.whitelist.is_empty() || self.whitelist.iter().any(|allowed| **allowed == *item)
    }

    fn set_slot(&mut self, index: usize, stack: ItemStack) -> u32 {
        if index >= self.slots.len() {
            return stack.count();
        }
        let Some(item) = stack.item() else {
            self.write(index, ItemStack::empty());
            return 0;
        };
        if !self.accepts(item) {
            return stack.count();
        }
        let limit = self.effective_stack_limit(item);
        let kept = stack.count().min(limit);
        let remainder = stack.count() - kept;
        self.write(index, stack.with_count(kept));
        remainder
    }

    fn add_stack(&mut self, stack: &ItemStack) -> u32 {
        let Some(item) = stack.item().cloned() else {
            return stack.count();
        };
        if !self.accepts(&item) {
            return stack.count();
        }
        let limit = self.effective_stack_limit(&item);
        let mut remaining = u64::from(stack.count());

        // Top up partial stacks first.
        for index in 0..self.slots.len() {
            let existing = &self.slots[index];
            if !existing.holds(&item) || existing.count() >= limit {
                continue;
            }
            let total = u64::from(existing.count()) + remaining;
            remaining = self.set_slot_total(index, &item, total);
            if remaining == 0 {
                return 0;
            }
        }

        for index in 0..self.slots.len() {
            if !self.slots[index].is_empty() {
                continue;
            }
            remaining = self.set_slot_total(index, &item, remaining);
            if remaining == 0 {
                return 0;
            }
        }

        u32::try_from(remaining).unwrap_or(u32::MAX)
    }

    fn remove_stack(&mut self, stack: &ItemStack) -> u32 {
        let Some(item) = stack.item().cloned() else {
            return 0;
        };
        let mut remaining = stack.count();
        for index in (0..self.slots.len()).rev() {
            let existing = &self.slots[index];
            if !existing.holds(&item) {
                continue;
            }
            let taken = existing.count().min(remaining);
            let left = existing.with_count(existing.count() - taken);
            self.write(index, left);
            remaining -= taken;
            if remaining == 0 {
                break;
            }
        }
        remaining
    }

    fn contains_stack(&self, stack: &ItemStack) -> bool {
        let Some(item) = stack.item() else {
            return true;
        };
        let wanted = u64::from(stack.count());
        let mut total = 0u64;
        for existing in &self.slots {
            if existing.holds(item) {
                total += u64::from(existing.count());
                if total >= wanted {
                    return true;
                }
            }
        }
        false
    }

    fn is_full(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| !slot.is_empty() && slot.count() == self.slot_stack_cap)
    }

    fn has_changed(&self) -> bool {
        self.changed
    }

    fn clear_changed(&mut self) {
        self.changed = false;
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunker_core::{IconHandle, ItemKey};

    fn item(key: &str, cap: u32) -> Arc<Item> {
        Arc::new(Item::new(
            ItemKey::parse(key).unwrap(),
            key,
            IconHandle::new(format!("icons/{key}.png")),
            cap,
        ))
    }

    fn stack(item: &Arc<Item>, count: u32) -> ItemStack {
        ItemStack::new(Arc::clone(item), count)
    }

    #[test]
    fn stack_limit_precedence() {
        assert_eq!(effective_stack_limit(16, 10), 10);
        assert_eq!(effective_stack_limit(4, 10), 4);
        assert_eq!(effective_stack_limit(16, 0), 16);
        assert_eq!(effective_stack_limit(0, 10), 10);
        assert_eq!(effective_stack_limit(0, 0), UNBOUNDED_STACK);
    }

    #[test]
    fn set_slot_clamps_to_limit() {
        let bolt = item("bolt", 0);
        let mut inv = Inventory::new("crate", 4, 10, Vec::new());

        assert_eq!(inv.set_slot(0, stack(&bolt, 13)), 3);
        assert_eq!(inv.stack(0), Some(&stack(&bolt, 10)));
        assert!(inv.has_changed());
        assert_eq!(inv.revision(), 1);
    }

    #[test]
    fn set_slot_merge_reports_remainder() {
        let bolt = item("bolt", 0);
        let mut inv = Inventory::new("crate", 4, 10, Vec::new());
        inv.set_slot(2, stack(&bolt, 7));

        assert_eq!(inv.set_slot(2, stack(&bolt, 7 + 6)), 3);
        assert_eq!(inv.stack(2).unwrap().count(), 10);
    }

    #[test]
    fn set_slot_out_of_range_is_rejected() {
        let bolt = item("bolt", 0);
        let mut inv = Inventory::new("crate", 2, 0, Vec::new());

        assert_eq!(inv.set_slot(2, stack(&bolt, 5)), 5);
        assert!(!inv.has_changed());
        assert_eq!(inv.revision(), 0);
    }

    #[test]
    fn clearing_is_idempotent_and_bypasses_whitelist() {
        let bolt = item("bolt", 0);
        let wire = item("wire", 0);
        let mut inv = Inventory::new("tray", 2, 0, vec![Arc::clone(&bolt)]);

        assert_eq!(inv.set_slot(0, stack(&wire, 2)), 2);
        assert!(inv.stack(0).unwrap().is_empty());

        inv.set_slot(0, stack(&bolt, 2));
        assert_eq!(inv.set_slot(0, ItemStack::empty()), 0);
        assert_eq!(inv.set_slot(0, ItemStack::empty()), 0);
        assert!(inv.stack(0).unwrap().is_empty());
    }

    #[test]
    fn add_merges_before_filling() {
        let bolt = item("bolt", 16);
        let mut inv = Inventory::new("backpack", 4, 0, Vec::new());
        inv.set_slot(2, stack(&bolt, 10));

        assert_eq!(inv.add_stack(&stack(&bolt, 12)), 0);
        assert_eq!(inv.stack(0).unwrap().count(), 6);
        assert!(inv.stack(1).unwrap().is_empty());
        assert_eq!(inv.stack(2).unwrap().count(), 16);
    }

    #[test]
    fn add_returns_unplaced_remainder() {
        let bolt = item("bolt", 5);
        let mut inv = Inventory::new("pouch", 2, 0, Vec::new());

        assert_eq!(inv.add_stack(&stack(&bolt, 12)), 2);
        assert_eq!(inv.count_of(&bolt), 10);
    }

    #[test]
    fn add_rejects_empty_and_unlisted() {
        let bolt = item("bolt", 0);
        let wire = item("wire", 0);
        let mut inv = Inventory::new("tray", 3, 0, vec![Arc::clone(&bolt)]);

        assert_eq!(inv.add_stack(&ItemStack::empty()), 0);
        assert_eq!(inv.add_stack(&stack(&wire, 4)), 4);
        assert!(inv.is_empty());
        assert_eq!(inv.revision(), 0);
    }

    #[test]
    fn unbounded_slot_absorbs_large_counts() {
        let scrap = item("scrap", 0);
        let mut inv = Inventory::new("heap", 1, 0, Vec::new());

        assert_eq!(inv.add_stack(&stack(&scrap, u32::MAX - 1)), 0);
        assert_eq!(inv.add_stack(&stack(&scrap, 5)), 4);
        assert_eq!(inv.stack(0).unwrap().count(), u32::MAX);
    }

    #[test]
    fn remove_walks_from_the_back() {
        let bolt = item("bolt", 0);
        let mut inv = Inventory::new("backpack", 3, 10, Vec::new());
        inv.set_slot(0, stack(&bolt, 10));
        inv.set_slot(2, stack(&bolt, 4));

        assert_eq!(inv.remove_stack(&stack(&bolt, 6)), 0);
        assert!(inv.stack(2).unwrap().is_empty());
        assert_eq!(inv.stack(0).unwrap().count(), 8);

        assert_eq!(inv.remove_stack(&stack(&bolt, 20)), 12);
        assert!(inv.is_empty());
        assert_eq!(inv.remove_stack(&ItemStack::empty()), 0);
    }

    #[test]
    fn contains_sums_across_slots() {
        let bolt = item("bolt", 0);
        let wire = item("wire", 0);
        let mut inv = Inventory::new("backpack", 3, 4, Vec::new());
        inv.add_stack(&stack(&bolt, 7));

        assert!(inv.contains_stack(&stack(&bolt, 7)));
        assert!(!inv.contains_stack(&stack(&bolt, 8)));
        assert!(!inv.contains_stack(&stack(&wire, 1)));
        assert!(inv.contains_stack(&ItemStack::empty()));
    }

    #[test]
    fn full_means_every_slot_at_container_cap() {
        let filter = item("filter", 0);
        let mut inv = Inventory::new("tray", 2, 3, Vec::new());
        assert!(!inv.is_full());

        inv.add_stack(&stack(&filter, 5));
        assert!(!inv.is_full());
        inv.add_stack(&stack(&filter, 1));
        assert!(inv.is_full());

        let uncapped = Inventory::new("heap", 1, 0, Vec::new());
        assert!(!uncapped.is_full());
    }

    #[test]
    fn reconfigure_returns_previous_contents() {
        let bolt = item("bolt", 0);
        let mut inv = Inventory::new("tray", 2, 0, Vec::new());
        inv.add_stack(&stack(&bolt, 3));

        let previous = inv.reconfigure(4, 2, vec![Arc::clone(&bolt)]);
        assert_eq!(previous, vec![stack(&bolt, 3)]);
        assert_eq!(inv.size(), 4);
        assert_eq!(inv.slot_stack_cap(), 2);
        assert!(inv.is_empty());
    }
}
