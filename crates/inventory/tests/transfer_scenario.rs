//! Golden scenario: a sequence of drag-and-drop transfers between a backpack
//! and a capped pouch.

use std::path::PathBuf;

use anyhow::Result;
use bunker_inventory::{
    Container, InventoryKindSpec, InventoryRegistry, InventorySpec, SlotRef, TransferKind,
};
use bunker_testkit::{
    run_scenario, sample_catalog, stack_label, stack_of, InventoryView, ScenarioConfig,
    ScenarioStep,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Outcome {
    kind: TransferKind,
    spill: String,
}

fn spec(name: &str, capacity: usize, slot_stack_cap: u32) -> InventorySpec {
    InventorySpec {
        name: name.into(),
        capacity,
        slot_stack_cap,
        whitelist: Vec::new(),
        kind: InventoryKindSpec::Plain,
    }
}

#[test]
fn drag_and_drop_sequence_matches_golden() -> Result<()> {
    let catalog = sample_catalog();
    let mut registry =
        InventoryRegistry::bootstrap(&[spec("backpack", 3, 0), spec("pouch", 2, 4)], &catalog)?;
    let backpack = registry.id_by_name("backpack").expect("backpack");
    let pouch = registry.id_by_name("pouch").expect("pouch");

    {
        let bag = registry.get_mut(backpack).expect("backpack");
        bag.set_slot(0, stack_of(&catalog, "bolt", 10));
        bag.set_slot(1, stack_of(&catalog, "wire", 5));
    }
    registry
        .get_mut(pouch)
        .expect("pouch")
        .set_slot(0, stack_of(&catalog, "battery", 3));

    let at = SlotRef::new;
    let steps = vec![
        ScenarioStep::new("bolts onto empty pouch slot", (at(backpack, 0), at(pouch, 1))),
        ScenarioStep::new("merge bolts back", (at(pouch, 1), at(backpack, 0))),
        ScenarioStep::new("wire onto battery", (at(backpack, 1), at(pouch, 0))),
        ScenarioStep::new("reorder within backpack", (at(backpack, 2), at(backpack, 0))),
        ScenarioStep::new("drop onto itself", (at(backpack, 0), at(backpack, 0))),
        ScenarioStep::new("bolts onto wire", (at(backpack, 2), at(pouch, 0))),
    ];

    let config = ScenarioConfig {
        name: "drag_and_drop".into(),
        snapshot_path: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/golden/transfer_scenario.json"),
    };

    run_scenario(
        config,
        registry,
        steps,
        |registry, (from, to)| {
            let outcome = registry.request_transfer(from, to);
            Outcome {
                kind: outcome.kind,
                spill: stack_label(&outcome.spill),
            }
        },
        |registry| {
            registry
                .ids()
                .filter_map(|id| registry.get(id))
                .map(|inv| InventoryView::capture(inv.name(), &inv.slots()))
                .collect::<Vec<_>>()
        },
    )
}
