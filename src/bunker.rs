//! Bunker systems that repair orders restore.

use serde::Deserialize;
use std::fmt;

/// Maximum durability of any system.
pub const MAX_DURABILITY: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BunkerSystemType {
    AirFiltration,
    WaterPurification,
    PowerSupply,
}

impl BunkerSystemType {
    pub const ALL: [BunkerSystemType; 3] = [
        BunkerSystemType::AirFiltration,
        BunkerSystemType::WaterPurification,
        BunkerSystemType::PowerSupply,
    ];

    /// Identifier carried by repair orders.
    pub fn id(self) -> &'static str {
        match self {
            BunkerSystemType::AirFiltration => "AirFiltration",
            BunkerSystemType::WaterPurification => "WaterPurification",
            BunkerSystemType::PowerSupply => "PowerSupply",
        }
    }

    /// Resolve an order identifier or a command token
    /// (`air_filtration`, `airfiltration`, `AirFiltration`, `air`).
    pub fn parse(token: &str) -> Option<Self> {
        let normalized: String = token
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "airfiltration" | "air" => Some(BunkerSystemType::AirFiltration),
            "waterpurification" | "water" => Some(BunkerSystemType::WaterPurification),
            "powersupply" | "power" => Some(BunkerSystemType::PowerSupply),
            _ => None,
        }
    }
}

impl fmt::Display for BunkerSystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&readable_name(self.id()))
    }
}

/// Split a CamelCase identifier into words ("AirFiltration" -> "Air Filtration").
pub fn readable_name(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 4);
    for (i, c) in id.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    Operational,
    Damaged,
    Critical,
    Offline,
}

impl SystemStatus {
    pub fn from_durability(durability: u32) -> Self {
        match durability {
            75.. => SystemStatus::Operational,
            40..=74 => SystemStatus::Damaged,
            1..=39 => SystemStatus::Critical,
            0 => SystemStatus::Offline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BunkerSystem {
    kind: BunkerSystemType,
    durability: u32,
}

impl BunkerSystem {
    pub fn new(kind: BunkerSystemType, durability: u32) -> Self {
        Self {
            kind,
            durability: durability.min(MAX_DURABILITY),
        }
    }

    pub fn kind(&self) -> BunkerSystemType {
        self.kind
    }

    pub fn durability(&self) -> u32 {
        self.durability
    }

    pub fn status(&self) -> SystemStatus {
        SystemStatus::from_durability(self.durability)
    }

    /// Restore `amount` durability, clamped at [`MAX_DURABILITY`].
    pub fn repair(&mut self, amount: u32) -> u32 {
        self.durability = self.durability.saturating_add(amount).min(MAX_DURABILITY);
        self.durability
    }
}

/// Every system of the bunker, in [`BunkerSystemType::ALL`] order.
#[derive(Debug, Clone)]
pub struct Bunker {
    systems: Vec<BunkerSystem>,
}

impl Bunker {
    pub fn new(durability: impl Fn(BunkerSystemType) -> u32) -> Self {
        Self {
            systems: BunkerSystemType::ALL
                .iter()
                .map(|&kind| BunkerSystem::new(kind, durability(kind)))
                .collect(),
        }
    }

    pub fn systems(&self) -> &[BunkerSystem] {
        &self.systems
    }

    pub fn system(&self, kind: BunkerSystemType) -> Option<&BunkerSystem> {
        self.systems.iter().find(|s| s.kind == kind)
    }

    /// Repair `kind` by `amount`, returning the new durability.
    pub fn repair(&mut self, kind: BunkerSystemType, amount: u32) -> Option<u32> {
        let system = self.systems.iter_mut().find(|s| s.kind == kind)?;
        let durability = system.repair(amount);
        tracing::debug!(system = kind.id(), amount, durability, "system repaired");
        Some(durability)
    }
}
