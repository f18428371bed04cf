#![warn(missing_docs)]
//! Slot inventories for the bunker: fixed-capacity containers, the
//! drag-and-drop transfer resolver, repair ingredient trays, and the
//! registry that initializes them at startup.

mod container;
mod inventory;
mod registry;
mod repair;
mod transfer;

pub use container::Container;
pub use inventory::{effective_stack_limit, Inventory, UNBOUNDED_STACK};
pub use registry::{
    InventoryError, InventoryId, InventoryKind, InventoryKindSpec, InventoryRegistry,
    InventorySpec, SlotRef,
};
pub use repair::{RepairCompletion, RepairInventory, RepairOrder};
pub use transfer::{transfer_between, transfer_within, TransferKind, TransferOutcome};
