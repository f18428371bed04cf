//! Game-side driver: owns the inventories, the bunker and the alert queue, and
//! turns repair completions into durability.

use anyhow::{bail, Context, Result};
use bunker_core::{ItemCatalog, ItemStack};
use bunker_inventory::{
    Container, InventoryId, InventoryRegistry, RepairCompletion, RepairOrder, SlotRef,
    TransferOutcome,
};
use tracing::{debug, info, warn};

use crate::alerts::{Alert, AlertKind, AlertQueue};
use crate::bunker::{Bunker, BunkerSystemType, SystemStatus};
use crate::commands::{describe_all, CommandContext, CommandError, SlotArg};
use crate::config::BunkerConfig;

/// A repair recipe with its items resolved against the catalog.
#[derive(Debug, Clone)]
struct Recipe {
    system: BunkerSystemType,
    ingredients: Vec<ItemStack>,
    percent: u32,
    slots: usize,
}

#[derive(Debug)]
pub struct Session {
    catalog: ItemCatalog,
    registry: InventoryRegistry,
    backpack: InventoryId,
    tray: InventoryId,
    recipes: Vec<Recipe>,
    bunker: Bunker,
    alerts: AlertQueue,
}

impl Session {
    pub fn new(config: &BunkerConfig, catalog: ItemCatalog) -> Result<Self> {
        let registry = InventoryRegistry::bootstrap(&config.inventories, &catalog)
            .context("failed to initialize inventories")?;

        let backpack = registry
            .id_by_name(&config.backpack)
            .with_context(|| format!("backpack inventory `{}` is not declared", config.backpack))?;
        let tray = registry.id_by_name(&config.repair_tray).with_context(|| {
            format!("repair tray inventory `{}` is not declared", config.repair_tray)
        })?;
        if registry.repair(tray).is_none() {
            bail!("inventory `{}` must have kind = \"repair\"", config.repair_tray);
        }
        if backpack == tray {
            bail!("the backpack and the repair tray must be different inventories");
        }

        let mut recipes: Vec<Recipe> = Vec::with_capacity(config.recipes.len());
        for recipe in &config.recipes {
            if recipes.iter().any(|known| known.system == recipe.system) {
                warn!(system = recipe.system.id(), "duplicate repair recipe ignored");
                continue;
            }
            let mut ingredients = Vec::with_capacity(recipe.ingredients.len());
            for ingredient in &recipe.ingredients {
                let item = catalog.get(&ingredient.item).with_context(|| {
                    format!(
                        "repair recipe for {} uses unknown item `{}`",
                        recipe.system, ingredient.item
                    )
                })?;
                ingredients.push(ItemStack::new(item.clone(), ingredient.count));
            }
            recipes.push(Recipe {
                system: recipe.system,
                ingredients,
                percent: recipe.percent,
                slots: recipe.slots,
            });
        }

        let bunker = Bunker::new(|kind| config.systems.durability(kind));
        info!(
            inventories = registry.len(),
            recipes = recipes.len(),
            items = catalog.len(),
            "session ready"
        );

        Ok(Self {
            catalog,
            registry,
            backpack,
            tray,
            recipes,
            bunker,
            alerts: AlertQueue::default(),
        })
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn bunker(&self) -> &Bunker {
        &self.bunker
    }

    /// Apply pending repair completions and hand back every queued alert.
    pub fn settle(&mut self) -> Vec<Alert> {
        let completions = self
            .registry
            .repair_mut(self.tray)
            .map(|tray| tray.drain_completions())
            .unwrap_or_default();
        for completion in completions {
            self.complete(completion);
        }

        let changed = self.registry.drain_changed();
        if !changed.is_empty() {
            debug!(?changed, "inventories changed");
        }
        self.alerts.drain()
    }

    fn complete(&mut self, completion: RepairCompletion) {
        let Some(system) = BunkerSystemType::parse(&completion.target) else {
            warn!(target_system = %completion.target, "completion for unknown system dropped");
            return;
        };

        let Some(tray) = self.registry.repair_mut(self.tray) else {
            return;
        };
        // The tray may have been emptied again between the fill and this
        // settle; such a completion is stale and the order stays open.
        let present = tray.target() == Some(completion.target.as_str())
            && completion
                .ingredients
                .iter()
                .all(|ingredient| tray.contains_stack(ingredient));
        if !present {
            debug!(system = system.id(), "stale repair completion dropped");
            return;
        }
        for ingredient in &completion.ingredients {
            let unmet = tray.remove_stack(ingredient);
            debug_assert_eq!(unmet, 0, "checked ingredient missing on consume");
        }
        let leftovers = tray.clear_order();
        self.return_to_backpack(leftovers);

        let durability = self.bunker.repair(system, completion.effect);
        let status = self.bunker.system(system).map(|s| s.status());
        info!(
            system = system.id(),
            effect = completion.effect,
            ?durability,
            ?status,
            "repair applied"
        );
        let used = completion
            .ingredients
            .iter()
            .filter_map(|stack| {
                stack
                    .item()
                    .map(|item| format!("{} x{}", item.name(), stack.count()))
            })
            .collect::<Vec<_>>()
            .join(", ");
        self.alerts.push(Alert::new(
            format!(
                "Repaired {}% {system} system durability using {used}",
                completion.effect
            ),
            AlertKind::Success,
        ));
    }

    /// Put `stacks` back into the backpack, reporting what does not fit.
    fn return_to_backpack(&mut self, stacks: Vec<ItemStack>) {
        for stack in stacks {
            let leftover = self.give(&stack);
            if leftover > 0 {
                if let Some(item) = stack.item() {
                    self.alerts.push(Alert::new(
                        format!(
                            "Backpack is full! Could not add {leftover}x {} to backpack",
                            item.name()
                        ),
                        AlertKind::Failure,
                    ));
                }
            }
        }
    }

    fn resolve(&self, slot: &SlotArg) -> Result<SlotRef, CommandError> {
        let id = self
            .registry
            .id_by_name(&slot.inventory)
            .ok_or_else(|| CommandError::new(format!("Unknown inventory: {}", slot.inventory)))?;
        let size = self.registry.get(id).map_or(0, |container| container.size());
        if slot.slot >= size {
            return Err(CommandError::new(format!(
                "{} has no slot {} ({size} slots)",
                slot.inventory, slot.slot
            )));
        }
        Ok(SlotRef::new(id, slot.slot))
    }

    fn recipe(&self, system: BunkerSystemType) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.system == system)
    }
}

impl CommandContext for Session {
    fn give(&mut self, stack: &ItemStack) -> u32 {
        self.registry
            .get_mut(self.backpack)
            .map_or(stack.count(), |backpack| backpack.add_stack(stack))
    }

    fn take(&mut self, stack: &ItemStack) -> u32 {
        self.registry
            .get_mut(self.backpack)
            .map_or(stack.count(), |backpack| backpack.remove_stack(stack))
    }

    fn backpack_has(&self, stack: &ItemStack) -> bool {
        self.registry
            .get(self.backpack)
            .is_some_and(|backpack| backpack.contains_stack(stack))
    }

    fn set_slot(&mut self, target: &SlotArg, stack: ItemStack) -> Result<u32, CommandError> {
        let slot = self.resolve(target)?;
        let container = self
            .registry
            .get_mut(slot.inventory)
            .ok_or_else(|| CommandError::new(format!("Unknown inventory: {}", target.inventory)))?;
        Ok(container.set_slot(slot.index, stack))
    }

    fn transfer(&mut self, from: &SlotArg, to: &SlotArg) -> Result<TransferOutcome, CommandError> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        Ok(self.registry.request_transfer(source, target))
    }

    fn inventory_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    fn contents(&self, inventory: &str) -> Result<Vec<ItemStack>, CommandError> {
        self.registry
            .id_by_name(inventory)
            .and_then(|id| self.registry.get(id))
            .map(|container| container.slots())
            .ok_or_else(|| CommandError::new(format!("Unknown inventory: {inventory}")))
    }

    fn open_repair(&mut self, system: BunkerSystemType) -> Result<Vec<ItemStack>, CommandError> {
        let recipe = self
            .recipe(system)
            .cloned()
            .ok_or_else(|| CommandError::new(format!("No repair recipe for {system}")))?;

        let tray = self
            .registry
            .repair_mut(self.tray)
            .ok_or_else(|| CommandError::new("Repair tray is unavailable"))?;
        let previous = tray
            .configure(RepairOrder {
                ingredients: recipe.ingredients.clone(),
                slot_count: recipe.slots,
                effect: recipe.percent,
                target: system.id().to_string(),
            })
            .map_err(|err| CommandError::new(err.to_string()))?;
        let requirements = tray.requirements().to_vec();
        self.return_to_backpack(previous);

        for needed in &requirements {
            if !self.backpack_has(needed) {
                if let Some(item) = needed.item() {
                    self.alerts.push(Alert::new(
                        format!(
                            "Not enough {} in backpack to repair! Required: {}",
                            item.name(),
                            needed.count()
                        ),
                        AlertKind::Failure,
                    ));
                }
            }
        }
        debug!(system = system.id(), needs = %describe_all(&requirements), "repair tray opened");
        Ok(requirements)
    }

    fn cancel_repair(&mut self) -> bool {
        let Some(tray) = self.registry.repair_mut(self.tray) else {
            return false;
        };
        if !tray.has_order() {
            return false;
        }
        let returned = tray.clear_order();
        if !returned.is_empty() {
            self.alerts.push(Alert::new(
                format!("Returned {} to backpack", describe_all(&returned)),
                AlertKind::Info,
            ));
        }
        self.return_to_backpack(returned);
        true
    }

    fn systems(&self) -> Vec<(BunkerSystemType, u32, SystemStatus)> {
        self.bunker
            .systems()
            .iter()
            .map(|system| (system.kind(), system.durability(), system.status()))
            .collect()
    }

    fn alert(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }
}
