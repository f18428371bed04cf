//! Repair trays: inventories that collect the ingredients of one repair order.
//!
//! A tray starts idle and refuses everything. [`RepairInventory::configure`]
//! loads an order, which fixes the whitelist and slot layout. After every
//! mutation that changes the tray, completion is re-evaluated; the transition
//! into "satisfied" queues exactly one [`RepairCompletion`]. Consuming the
//! ingredients is left to whoever drains the queue.

use std::collections::VecDeque;
use std::sync::Arc;

use bunker_core::{Item, ItemStack};
use tracing::{debug, info};

use crate::container::Container;
use crate::inventory::{effective_stack_limit, Inventory};
use crate::registry::InventoryError;
use crate::transfer::{self, TransferOutcome};

/// Ingredients and payload of one repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOrder {
    /// Required stacks. Empty stacks are ignored.
    pub ingredients: Vec<ItemStack>,
    /// Requested slot count; the tray grows if the ingredients need more.
    pub slot_count: usize,
    /// Effect payload (repair percentage).
    pub effect: u32,
    /// Identifier of the system being repaired.
    pub target: String,
}

/// Signal raised when a tray first holds everything its order requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairCompletion {
    /// Stacks the tray holds for the order, ready to be consumed.
    pub ingredients: Vec<ItemStack>,
    /// Effect payload copied from the order.
    pub effect: u32,
    /// Target system copied from the order.
    pub target: String,
}

#[derive(Debug, Clone)]
struct ActiveOrder {
    ingredients: Vec<ItemStack>,
    effect: u32,
    target: String,
    single: bool,
}

/// Ingredient tray bound to at most one [`RepairOrder`].
#[derive(Debug, Clone)]
pub struct RepairInventory {
    inventory: Inventory,
    idle_capacity: usize,
    order: Option<ActiveOrder>,
    satisfied: bool,
    completions: VecDeque<RepairCompletion>,
}

impl RepairInventory {
    /// Create an idle tray with `capacity` slots.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            inventory: Inventory::new(name, capacity, 0, Vec::new()),
            idle_capacity: capacity,
            order: None,
            satisfied: false,
            completions: VecDeque::new(),
        }
    }

    /// Load `order`, discarding the current layout.
    ///
    /// A single-ingredient order caps every slot at the required count and
    /// completes when the tray is full. A multi-ingredient order leaves slots
    /// to the item caps and completes once every ingredient is present at the
    /// same time. Returns whatever the tray held before.
    pub fn configure(&mut self, order: RepairOrder) -> Result<Vec<ItemStack>, InventoryError> {
        let mut ingredients: Vec<ItemStack> = Vec::new();
        for stack in order.ingredients.into_iter().filter(|stack| !stack.is_empty()) {
            // Repeated items collapse into one requirement for their sum.
            match ingredients.iter_mut().find(|known| known.same_item(&stack)) {
                Some(known) => {
                    let total = known.count().checked_add(stack.count()).ok_or_else(|| {
                        InventoryError::UnsatisfiableOrder {
                            item: stack.to_string(),
                            limit: u32::MAX,
                        }
                    })?;
                    *known = known.with_count(total);
                }
                None => ingredients.push(stack),
            }
        }
        if ingredients.is_empty() {
            return Err(InventoryError::EmptyOrder {
                target: order.target,
            });
        }

        let whitelist: Vec<Arc<Item>> = ingredients
            .iter()
            .filter_map(|stack| stack.item().cloned())
            .collect();

        let single = ingredients.len() == 1;
        let (capacity, slot_cap, reported) = if single {
            let required = &ingredients[0];
            let item_cap = required.item().map_or(0, |item| item.stack_cap());
            if item_cap != 0 && item_cap < required.count() {
                return Err(InventoryError::UnsatisfiableOrder {
                    item: required.to_string(),
                    limit: item_cap,
                });
            }
            let slots = order.slot_count.max(1);
            let per_tray = u64::from(required.count()) * slots as u64;
            let total = u32::try_from(per_tray).map_err(|_| InventoryError::UnsatisfiableOrder {
                item: required.to_string(),
                limit: u32::MAX,
            })?;
            (slots, required.count(), vec![required.with_count(total)])
        } else {
            let needed: usize = ingredients.iter().map(slots_needed).sum();
            (order.slot_count.max(needed), 0, ingredients.clone())
        };

        let previous = self.inventory.reconfigure(capacity, slot_cap, whitelist);
        debug!(
            tray = self.inventory.name(),
            system = %order.target,
            slots = capacity,
            slot_cap,
            "repair order configured"
        );
        self.order = Some(ActiveOrder {
            ingredients: reported,
            effect: order.effect,
            target: order.target,
            single,
        });
        self.satisfied = false;
        Ok(previous)
    }

    /// Return the tray to the idle state, handing back its contents.
    pub fn clear_order(&mut self) -> Vec<ItemStack> {
        self.order = None;
        self.satisfied = false;
        self.inventory.reconfigure(self.idle_capacity, 0, Vec::new())
    }

    /// Whether an order is loaded.
    pub fn has_order(&self) -> bool {
        self.order.is_some()
    }

    /// Target of the loaded order.
    pub fn target(&self) -> Option<&str> {
        self.order.as_ref().map(|order| order.target.as_str())
    }

    /// Stacks the loaded order requires in total.
    pub fn requirements(&self) -> &[ItemStack] {
        match &self.order {
            Some(order) => &order.ingredients,
            None => &[],
        }
    }

    /// Whether the tray currently satisfies its order.
    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    /// Take every queued completion, oldest first.
    pub fn drain_completions(&mut self) -> Vec<RepairCompletion> {
        self.completions.drain(..).collect()
    }

    fn evaluate(&self) -> bool {
        match &self.order {
            None => false,
            Some(order) if order.single => self.inventory.is_full(),
            Some(order) => order
                .ingredients
                .iter()
                .all(|stack| self.inventory.contains_stack(stack)),
        }
    }

    fn reconcile(&mut self, before: u64) {
        if self.inventory.revision() == before {
            return;
        }
        let satisfied = self.evaluate();
        if satisfied && !self.satisfied {
            if let Some(order) = &self.order {
                info!(
                    tray = self.inventory.name(),
                    system = %order.target,
                    effect = order.effect,
                    "repair order satisfied"
                );
                self.completions.push_back(RepairCompletion {
                    ingredients: order.ingredients.clone(),
                    effect: order.effect,
                    target: order.target.clone(),
                });
            }
        }
        self.satisfied = satisfied;
    }
}

fn slots_needed(stack: &ItemStack) -> usize {
    let cap = stack.item().map_or(0, |item| item.stack_cap());
    let limit = effective_stack_limit(cap, 0);
    let count = stack.count();
    (count / limit + u32::from(count % limit != 0)) as usize
}

impl Container for RepairInventory {
    fn name(&self) -> &str {
        self.inventory.name()
    }

    fn size(&self) -> usize {
        self.inventory.size()
    }

    fn stack(&self, index: usize) -> Option<&ItemStack> {
        self.inventory.stack(index)
    }

    fn slot_stack_cap(&self) -> u32 {
        self.inventory.slot_stack_cap()
    }

    fn accepts(&self, item: &Item) -> bool {
        self.order.is_some() && self.inventory.accepts(item)
    }

    fn set_slot(&mut self, index: usize, stack: ItemStack) -> u32 {
        if self.order.is_none() && !stack.is_empty() {
            return stack.count();
        }
        let before = self.inventory.revision();
        let remainder = self.inventory.set_slot(index, stack);
        self.reconcile(before);
        remainder
    }

    fn add_stack(&mut self, stack: &ItemStack) -> u32 {
        if self.order.is_none() {
            return stack.count();
        }
        let before = self.inventory.revision();
        let remainder = self.inventory.add_stack(stack);
        self.reconcile(before);
        remainder
    }

    fn remove_stack(&mut self, stack: &ItemStack) -> u32 {
        let before = self.inventory.revision();
        let unmet = self.inventory.remove_stack(stack);
        self.reconcile(before);
        unmet
    }

    fn contains_stack(&self, stack: &ItemStack) -> bool {
        self.inventory.contains_stack(stack)
    }

    fn is_full(&self) -> bool {
        self.inventory.is_full()
    }

    fn has_changed(&self) -> bool {
        self.inventory.has_changed()
    }

    fn clear_changed(&mut self) {
        self.inventory.clear_changed();
    }

    fn revision(&self) -> u64 {
        self.inventory.revision()
    }

    fn transfer_within(&mut self, source: usize, target: usize) -> TransferOutcome {
        // Both writes land before the order is re-evaluated.
        let before = self.inventory.revision();
        let outcome = transfer::transfer_within(&mut self.inventory, source, target);
        self.reconcile(before);
        outcome
    }
}
