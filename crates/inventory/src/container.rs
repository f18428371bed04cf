//! Container trait shared by every slot-addressed inventory.

use bunker_core::{Item, ItemStack};

use crate::transfer::TransferOutcome;

/// Something that stores item stacks in a fixed number of slots.
///
/// Every mutating operation reports what it could not do as a value: a
/// remainder for placements and an unmet count for removals. Nothing here
/// panics on malformed input.
pub trait Container {
    /// Display name of the container.
    fn name(&self) -> &str;

    /// Number of slots. Fixed for the container's lifetime (or until a repair
    /// tray is reconfigured for a new order).
    fn size(&self) -> usize;

    /// The stack held in `index`, or `None` when the index is out of range.
    fn stack(&self, index: usize) -> Option<&ItemStack>;

    /// Container-wide per-slot cap (0 = no container-imposed cap).
    fn slot_stack_cap(&self) -> u32;

    /// Whether the container is willing to hold `item` at all.
    fn accepts(&self, item: &Item) -> bool;

    /// Per-slot cap for `item` in this container.
    fn effective_stack_limit(&self, item: &Item) -> u32 {
        crate::effective_stack_limit(item.stack_cap(), self.slot_stack_cap())
    }

    /// Overwrite slot `index`, returning the part of `stack` that did not fit.
    ///
    /// An empty `stack` clears the slot and returns 0. Out-of-range indices
    /// and items outside the whitelist leave the slot untouched and return
    /// the full count.
    fn set_slot(&mut self, index: usize, stack: ItemStack) -> u32;

    /// Spread `stack` over the container, topping up matching slots before
    /// filling empty ones. Returns the unplaced remainder.
    fn add_stack(&mut self, stack: &ItemStack) -> u32;

    /// Remove `stack.count()` items of `stack`'s item, last slot first.
    /// Returns the count that could not be removed.
    fn remove_stack(&mut self, stack: &ItemStack) -> u32;

    /// Whether the container holds at least `stack.count()` of the item.
    fn contains_stack(&self, stack: &ItemStack) -> bool;

    /// Every slot holds an item at exactly the container-wide cap.
    fn is_full(&self) -> bool;

    /// Whether the contents changed since the last [`Container::clear_changed`].
    fn has_changed(&self) -> bool;

    /// Acknowledge the pending change notification.
    fn clear_changed(&mut self);

    /// Monotonic mutation counter.
    fn revision(&self) -> u64;

    /// Resolve a drag from `source` onto `target` inside this container.
    fn transfer_within(&mut self, source: usize, target: usize) -> TransferOutcome {
        crate::transfer::transfer_within(self, source, target)
    }

    /// True when no slot holds anything.
    fn is_empty(&self) -> bool {
        (0..self.size()).all(|i| self.stack(i).map_or(true, ItemStack::is_empty))
    }

    /// Total number of `item` across all slots.
    fn count_of(&self, item: &Item) -> u64 {
        (0..self.size())
            .filter_map(|i| self.stack(i))
            .filter(|stack| stack.holds(item))
            .map(|stack| u64::from(stack.count()))
            .sum()
    }

    /// Clone of every slot, in order.
    fn slots(&self) -> Vec<ItemStack> {
        (0..self.size())
            .map(|i| self.stack(i).cloned().unwrap_or_default())
            .collect()
    }
}
