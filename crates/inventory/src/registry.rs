//! Startup registry of every inventory in the bunker.
//!
//! The registry is built once from configuration, initializing each
//! inventory before anything else can reach it. Afterwards it owns the
//! inventories, routes transfer requests and collects change notifications.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bunker_core::{Item, ItemCatalog};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::container::Container;
use crate::inventory::Inventory;
use crate::repair::RepairInventory;
use crate::transfer::{transfer_between, TransferOutcome};

/// Errors raised while building inventories or loading repair orders.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// Two inventories share a name.
    #[error("duplicate inventory name `{0}`")]
    DuplicateName(String),
    /// An inventory was declared without slots.
    #[error("inventory `{0}` must have at least one slot")]
    ZeroCapacity(String),
    /// A whitelist names an item the catalog does not know.
    #[error("inventory `{inventory}` whitelists unknown item `{key}`")]
    UnknownItem {
        /// Inventory being built.
        inventory: String,
        /// Key as written in configuration.
        key: String,
    },
    /// A repair order without ingredients.
    #[error("repair order for `{target}` has no ingredients")]
    EmptyOrder {
        /// Target system of the order.
        target: String,
    },
    /// A repair order whose requirement cannot fit the tray's slot layout.
    #[error("repair ingredient {item} exceeds the stack limit {limit}")]
    UnsatisfiableOrder {
        /// Offending ingredient.
        item: String,
        /// Limit it exceeds.
        limit: u32,
    },
}

/// Which kind of inventory a spec builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryKindSpec {
    /// Ordinary container.
    #[default]
    Plain,
    /// Repair ingredient tray.
    Repair,
}

/// Declarative description of one inventory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InventorySpec {
    /// Unique name.
    pub name: String,
    /// Slot count (idle slot count for repair trays).
    pub capacity: usize,
    /// Container-wide cap (0 = none). Ignored for repair trays.
    #[serde(default)]
    pub slot_stack_cap: u32,
    /// Accepted item keys (empty = everything). Ignored for repair trays.
    #[serde(default)]
    pub whitelist: Vec<String>,
    /// Plain container or repair tray.
    #[serde(default)]
    pub kind: InventoryKindSpec,
}

/// Index of an inventory inside its [`InventoryRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InventoryId(u32);

impl InventoryId {
    /// Raw index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InventoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One slot of one inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    /// Owning inventory.
    pub inventory: InventoryId,
    /// Slot index.
    pub index: usize,
}

impl SlotRef {
    /// Address `index` in `inventory`.
    pub fn new(inventory: InventoryId, index: usize) -> Self {
        Self { inventory, index }
    }
}

/// Storage for a registered inventory.
#[derive(Debug, Clone)]
pub enum InventoryKind {
    /// Ordinary container.
    Plain(Inventory),
    /// Repair ingredient tray.
    Repair(RepairInventory),
}

impl InventoryKind {
    /// Shared access through the [`Container`] interface.
    pub fn as_container(&self) -> &dyn Container {
        match self {
            InventoryKind::Plain(inv) => inv,
            InventoryKind::Repair(tray) => tray,
        }
    }

    /// Mutable access through the [`Container`] interface.
    pub fn as_container_mut(&mut self) -> &mut dyn Container {
        match self {
            InventoryKind::Plain(inv) => inv,
            InventoryKind::Repair(tray) => tray,
        }
    }
}

/// Every inventory of the bunker, addressable by id or name.
#[derive(Debug, Clone, Default)]
pub struct InventoryRegistry {
    entries: Vec<InventoryKind>,
    name_to_id: HashMap<String, InventoryId>,
}

impl InventoryRegistry {
    /// Build and initialize every inventory in `specs`, in order.
    pub fn bootstrap(specs: &[InventorySpec], catalog: &ItemCatalog) -> Result<Self, InventoryError> {
        let mut registry = Self::default();
        for spec in specs {
            if registry.name_to_id.contains_key(&spec.name) {
                return Err(InventoryError::DuplicateName(spec.name.clone()));
            }
            if spec.capacity == 0 {
                return Err(InventoryError::ZeroCapacity(spec.name.clone()));
            }
            let entry = match spec.kind {
                InventoryKindSpec::Plain => {
                    let whitelist = resolve_whitelist(spec, catalog)?;
                    InventoryKind::Plain(Inventory::new(
                        spec.name.clone(),
                        spec.capacity,
                        spec.slot_stack_cap,
                        whitelist,
                    ))
                }
                InventoryKindSpec::Repair => {
                    InventoryKind::Repair(RepairInventory::new(spec.name.clone(), spec.capacity))
                }
            };
            let id = InventoryId(registry.entries.len() as u32);
            debug!(
                inventory = %spec.name,
                %id,
                capacity = spec.capacity,
                slot_cap = spec.slot_stack_cap,
                kind = ?spec.kind,
                "inventory initialized"
            );
            registry.name_to_id.insert(spec.name.clone(), id);
            registry.entries.push(entry);
        }
        Ok(registry)
    }

    /// Number of inventories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no inventories.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a name.
    pub fn id_by_name(&self, name: &str) -> Option<InventoryId> {
        self.name_to_id.get(name).copied()
    }

    /// Inventory names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.as_container().name())
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = InventoryId> {
        (0..self.entries.len() as u32).map(InventoryId)
    }

    /// Look up an inventory.
    pub fn get(&self, id: InventoryId) -> Option<&dyn Container> {
        self.entries.get(id.index()).map(InventoryKind::as_container)
    }

    /// Look up an inventory for mutation.
    pub fn get_mut(&mut self, id: InventoryId) -> Option<&mut dyn Container> {
        self.entries
            .get_mut(id.index())
            .map(InventoryKind::as_container_mut)
    }

    /// Look up a repair tray.
    pub fn repair(&self, id: InventoryId) -> Option<&RepairInventory> {
        match self.entries.get(id.index()) {
            Some(InventoryKind::Repair(tray)) => Some(tray),
            _ => None,
        }
    }

    /// Look up a repair tray for mutation.
    pub fn repair_mut(&mut self, id: InventoryId) -> Option<&mut RepairInventory> {
        match self.entries.get_mut(id.index()) {
            Some(InventoryKind::Repair(tray)) => Some(tray),
            _ => None,
        }
    }

    /// Resolve a drop of `from` onto `to`.
    ///
    /// Unknown inventories reject the request without touching anything.
    pub fn request_transfer(&mut self, from: SlotRef, to: SlotRef) -> TransferOutcome {
        if from.inventory == to.inventory {
            return match self.get_mut(from.inventory) {
                Some(container) => container.transfer_within(from.index, to.index),
                None => TransferOutcome::rejected(),
            };
        }
        match self.pair_mut(from.inventory, to.inventory) {
            Some((source, target)) => transfer_between(source, from.index, target, to.index),
            None => TransferOutcome::rejected(),
        }
    }

    /// Ids of every inventory whose contents changed since the last drain.
    /// Clears the flags.
    pub fn drain_changed(&mut self) -> Vec<InventoryId> {
        let mut changed = Vec::new();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            let container = entry.as_container_mut();
            if container.has_changed() {
                container.clear_changed();
                changed.push(InventoryId(index as u32));
            }
        }
        changed
    }

    fn pair_mut(
        &mut self,
        a: InventoryId,
        b: InventoryId,
    ) -> Option<(&mut dyn Container, &mut dyn Container)> {
        let (ia, ib) = (a.index(), b.index());
        if ia == ib || ia >= self.entries.len() || ib >= self.entries.len() {
            return None;
        }
        if ia < ib {
            let (left, right) = self.entries.split_at_mut(ib);
            Some((left[ia].as_container_mut(), right[0].as_container_mut()))
        } else {
            let (left, right) = self.entries.split_at_mut(ia);
            Some((right[0].as_container_mut(), left[ib].as_container_mut()))
        }
    }
}

fn resolve_whitelist(
    spec: &InventorySpec,
    catalog: &ItemCatalog,
) -> Result<Vec<Arc<Item>>, InventoryError> {
    spec.whitelist
        .iter()
        .map(|key| {
            catalog
                .get(key)
                .cloned()
                .ok_or_else(|| InventoryError::UnknownItem {
                    inventory: spec.name.clone(),
                    key: key.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::RepairOrder;
    use crate::transfer::TransferKind;
    use bunker_core::{catalog_from_str, ItemStack};

    const PACK: &str = r#"[
        { "key": "bolt", "name": "Bolt", "stack_cap": 16 },
        { "key": "wire", "name": "Wire" }
    ]"#;

    fn spec(name: &str, capacity: usize) -> InventorySpec {
        InventorySpec {
            name: name.into(),
            capacity,
            slot_stack_cap: 0,
            whitelist: Vec::new(),
            kind: InventoryKindSpec::Plain,
        }
    }

    #[test]
    fn bootstrap_initializes_every_inventory() {
        let catalog = catalog_from_str(PACK).unwrap();
        let mut tray = spec("tray", 2);
        tray.kind = InventoryKindSpec::Repair;
        let registry =
            InventoryRegistry::bootstrap(&[spec("backpack", 8), tray, spec("stash", 4)], &catalog)
                .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["backpack", "tray", "stash"]
        );
        let tray = registry.id_by_name("tray").unwrap();
        assert!(registry.repair(tray).is_some());
        assert!(registry.repair(registry.id_by_name("stash").unwrap()).is_none());
        for id in registry.ids() {
            assert!(registry.get(id).unwrap().is_empty());
        }
    }

    #[test]
    fn bootstrap_rejects_bad_specs() {
        let catalog = catalog_from_str(PACK).unwrap();

        let err = InventoryRegistry::bootstrap(&[spec("a", 1), spec("a", 2)], &catalog).unwrap_err();
        assert_eq!(err, InventoryError::DuplicateName("a".into()));

        let err = InventoryRegistry::bootstrap(&[spec("a", 0)], &catalog).unwrap_err();
        assert_eq!(err, InventoryError::ZeroCapacity("a".into()));

        let mut listed = spec("a", 1);
        listed.whitelist = vec!["rope".into()];
        let err = InventoryRegistry::bootstrap(&[listed], &catalog).unwrap_err();
        assert!(matches!(err, InventoryError::UnknownItem { .. }));
    }

    #[test]
    fn request_transfer_routes_by_inventory() {
        let catalog = catalog_from_str(PACK).unwrap();
        let bolt = catalog.get("bolt").unwrap().clone();
        let mut registry =
            InventoryRegistry::bootstrap(&[spec("backpack", 2), spec("stash", 2)], &catalog)
                .unwrap();
        let backpack = registry.id_by_name("backpack").unwrap();
        let stash = registry.id_by_name("stash").unwrap();
        registry
            .get_mut(backpack)
            .unwrap()
            .set_slot(0, ItemStack::new(bolt.clone(), 5));
        registry.drain_changed();

        let outcome = registry.request_transfer(SlotRef::new(backpack, 0), SlotRef::new(stash, 1));
        assert_eq!(outcome.kind, TransferKind::Swapped);
        assert_eq!(
            registry.get(stash).unwrap().stack(1),
            Some(&ItemStack::new(bolt.clone(), 5))
        );
        assert_eq!(registry.drain_changed(), vec![backpack, stash]);
        assert!(registry.drain_changed().is_empty());

        let outcome = registry.request_transfer(SlotRef::new(stash, 1), SlotRef::new(stash, 0));
        assert_eq!(outcome.kind, TransferKind::Swapped);
        assert_eq!(registry.drain_changed(), vec![stash]);

        let ghost = InventoryId(9);
        let outcome = registry.request_transfer(SlotRef::new(ghost, 0), SlotRef::new(stash, 0));
        assert_eq!(outcome.kind, TransferKind::Rejected);
    }

    #[test]
    fn transfer_inside_tray_is_evaluated_once() {
        let catalog = catalog_from_str(PACK).unwrap();
        let bolt = catalog.get("bolt").unwrap().clone();
        let mut tray = spec("tray", 1);
        tray.kind = InventoryKindSpec::Repair;
        let mut registry = InventoryRegistry::bootstrap(&[tray], &catalog).unwrap();
        let tray = registry.id_by_name("tray").unwrap();
        let repair = registry.repair_mut(tray).unwrap();
        repair
            .configure(RepairOrder {
                ingredients: vec![ItemStack::new(bolt.clone(), 3)],
                slot_count: 2,
                effect: 20,
                target: "WaterPurification".into(),
            })
            .unwrap();
        repair.add_stack(&ItemStack::new(bolt.clone(), 3));
        assert!(repair.drain_completions().is_empty());

        let outcome = registry.request_transfer(SlotRef::new(tray, 0), SlotRef::new(tray, 1));
        assert_eq!(outcome.kind, TransferKind::Swapped);
        let repair = registry.repair_mut(tray).unwrap();
        assert_eq!(repair.stack(1), Some(&ItemStack::new(bolt, 3)));
        assert!(repair.drain_completions().is_empty());
    }
}
