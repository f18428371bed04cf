use bunker_inventory::{InventoryKindSpec, InventorySpec};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::warn;

use crate::bunker::BunkerSystemType;

pub const DEFAULT_CONFIG_PATH: &str = "config/bunker.toml";
pub const DEFAULT_CATALOG_PATH: &str = "config/items.json";

/// Bunker layout: inventories, repair recipes and starting durabilities.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BunkerConfig {
    /// Name of the player's backpack inventory.
    pub backpack: String,
    /// Name of the repair tray inventory.
    pub repair_tray: String,
    pub inventories: Vec<InventorySpec>,
    pub recipes: Vec<RecipeConfig>,
    pub systems: SystemsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeConfig {
    pub system: BunkerSystemType,
    pub ingredients: Vec<IngredientConfig>,
    /// Durability restored, in percent.
    pub percent: u32,
    #[serde(default = "default_recipe_slots")]
    pub slots: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientConfig {
    pub item: String,
    pub count: u32,
}

/// Starting durability per system (0..=100).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SystemsConfig {
    pub air_filtration: u32,
    pub water_purification: u32,
    pub power_supply: u32,
}

fn default_recipe_slots() -> usize {
    1
}

impl Default for SystemsConfig {
    fn default() -> Self {
        Self {
            air_filtration: 100,
            water_purification: 100,
            power_supply: 100,
        }
    }
}

impl SystemsConfig {
    pub fn durability(&self, system: BunkerSystemType) -> u32 {
        match system {
            BunkerSystemType::AirFiltration => self.air_filtration,
            BunkerSystemType::WaterPurification => self.water_purification,
            BunkerSystemType::PowerSupply => self.power_supply,
        }
    }
}

impl Default for BunkerConfig {
    fn default() -> Self {
        Self {
            backpack: "backpack".to_string(),
            repair_tray: "repair_tray".to_string(),
            inventories: vec![
                InventorySpec {
                    name: "backpack".to_string(),
                    capacity: 12,
                    slot_stack_cap: 0,
                    whitelist: Vec::new(),
                    kind: InventoryKindSpec::Plain,
                },
                InventorySpec {
                    name: "repair_tray".to_string(),
                    capacity: 1,
                    slot_stack_cap: 0,
                    whitelist: Vec::new(),
                    kind: InventoryKindSpec::Repair,
                },
            ],
            recipes: vec![
                RecipeConfig {
                    system: BunkerSystemType::AirFiltration,
                    ingredients: vec![IngredientConfig {
                        item: "air_filter".to_string(),
                        count: 1,
                    }],
                    percent: 25,
                    slots: 1,
                },
                RecipeConfig {
                    system: BunkerSystemType::PowerSupply,
                    ingredients: vec![IngredientConfig {
                        item: "battery".to_string(),
                        count: 2,
                    }],
                    percent: 40,
                    slots: 1,
                },
            ],
            systems: SystemsConfig::default(),
        }
    }
}

impl BunkerConfig {
    /// Load from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<BunkerConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    BunkerConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!(
                        "Bunker config not found at {}. Using defaults",
                        path.display()
                    );
                }
                BunkerConfig::default()
            }
        }
    }
}
