use std::fmt;
use std::sync::Arc;

use bunker_core::{Item, ItemCatalog, ItemStack};
use bunker_inventory::{TransferKind, TransferOutcome};

use crate::alerts::{Alert, AlertKind};
use crate::bunker::{BunkerSystemType, SystemStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

/// `inventory[slot]` as typed by the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotArg {
    pub inventory: String,
    pub slot: usize,
}

impl fmt::Display for SlotArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.inventory, self.slot)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameCommand {
    Help,
    Give {
        stack: ItemStack,
    },
    Take {
        stack: ItemStack,
    },
    Has {
        stack: ItemStack,
    },
    Set {
        target: SlotArg,
        stack: ItemStack,
    },
    Move {
        from: SlotArg,
        to: SlotArg,
    },
    List {
        inventory: Option<String>,
    },
    Repair {
        system: BunkerSystemType,
    },
    Cancel,
    Systems,
    Quit,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<String>,
}

pub trait CommandContext {
    /// Add to the backpack. Returns the count that did not fit.
    fn give(&mut self, stack: &ItemStack) -> u32;
    /// Remove from the backpack. Returns the count that could not be removed.
    fn take(&mut self, stack: &ItemStack) -> u32;
    fn backpack_has(&self, stack: &ItemStack) -> bool;

    /// Overwrite one slot. Returns the remainder.
    fn set_slot(&mut self, target: &SlotArg, stack: ItemStack) -> Result<u32, CommandError>;
    fn transfer(&mut self, from: &SlotArg, to: &SlotArg) -> Result<TransferOutcome, CommandError>;

    fn inventory_names(&self) -> Vec<String>;
    fn contents(&self, inventory: &str) -> Result<Vec<ItemStack>, CommandError>;

    /// Load the recipe for `system` into the repair tray. Returns what the
    /// tray now requires.
    fn open_repair(&mut self, system: BunkerSystemType) -> Result<Vec<ItemStack>, CommandError>;
    /// Close the current repair order. `false` when none was open.
    fn cancel_repair(&mut self) -> bool;

    fn systems(&self) -> Vec<(BunkerSystemType, u32, SystemStatus)>;

    fn alert(&mut self, alert: Alert);
}

pub fn execute_command(ctx: &mut impl CommandContext, cmd: GameCommand) -> CommandOutput {
    let mut out = CommandOutput::default();
    match cmd {
        GameCommand::Help => {
            out.lines.extend(help_lines());
        }
        GameCommand::Give { stack } => {
            let Some(item) = stack.item().cloned() else {
                out.lines.push("Error: give count must be > 0".to_string());
                return out;
            };
            let leftover = ctx.give(&stack);
            let given = stack.count().saturating_sub(leftover);
            if given > 0 {
                out.lines.push(format!("Gave {given}x {}", item.name()));
            }
            if leftover > 0 {
                ctx.alert(Alert::new(
                    format!(
                        "Backpack is full! Could not add {leftover}x {} to backpack",
                        item.name()
                    ),
                    AlertKind::Failure,
                ));
            }
        }
        GameCommand::Take { stack } => {
            if !ctx.backpack_has(&stack) {
                out.lines
                    .push(format!("Error: backpack holds fewer than {}", describe(&stack)));
                return out;
            }
            let unmet = ctx.take(&stack);
            let taken = stack.count().saturating_sub(unmet);
            out.lines.push(format!("Took {}", describe(&stack.with_count(taken))));
        }
        GameCommand::Has { stack } => {
            if ctx.backpack_has(&stack) {
                out.lines.push(format!("Backpack has {}", describe(&stack)));
            } else {
                out.lines
                    .push(format!("Backpack does not have {}", describe(&stack)));
            }
        }
        GameCommand::Set { target, stack } => match ctx.set_slot(&target, stack.clone()) {
            Ok(_) if stack.is_empty() => out.lines.push(format!("Cleared {target}")),
            Ok(remainder) => {
                let kept = stack.with_count(stack.count() - remainder);
                if kept.is_empty() {
                    out.lines
                        .push(format!("{target} does not accept {}", describe(&stack)));
                } else {
                    out.lines.push(format!("Set {target} to {}", describe(&kept)));
                    if remainder > 0 {
                        out.lines.push(format!("{remainder} did not fit"));
                    }
                }
            }
            Err(err) => out.lines.push(format!("Error: {err}")),
        },
        GameCommand::Move { from, to } => match ctx.transfer(&from, &to) {
            Ok(outcome) => {
                let resolution = match outcome.kind {
                    TransferKind::Merged => "merged",
                    TransferKind::Swapped => "swapped",
                    TransferKind::SwappedWithSpillback => "partial, rest returned",
                    TransferKind::Rejected => "rejected",
                };
                let line = format!("{from} -> {to}: {resolution}");
                out.lines.push(line);
                if !outcome.spill.is_empty() {
                    ctx.alert(Alert::new(
                        format!("No room for {}; dropped on the floor", describe(&outcome.spill)),
                        AlertKind::Warning,
                    ));
                }
            }
            Err(err) => out.lines.push(format!("Error: {err}")),
        },
        GameCommand::List { inventory } => {
            let names = match inventory {
                Some(name) => vec![name],
                None => ctx.inventory_names(),
            };
            for name in names {
                match ctx.contents(&name) {
                    Ok(slots) => {
                        out.lines.push(format!("{name} ({} slots):", slots.len()));
                        let mut any = false;
                        for (index, stack) in slots.iter().enumerate() {
                            if !stack.is_empty() {
                                any = true;
                                out.lines.push(format!("  [{index}] {}", describe(stack)));
                            }
                        }
                        if !any {
                            out.lines.push("  (empty)".to_string());
                        }
                    }
                    Err(err) => out.lines.push(format!("Error: {err}")),
                }
            }
        }
        GameCommand::Repair { system } => match ctx.open_repair(system) {
            Ok(requirements) => out.lines.push(format!(
                "Repair tray ready for {system}: needs {}",
                describe_all(&requirements)
            )),
            Err(err) => out.lines.push(format!("Error: {err}")),
        },
        GameCommand::Cancel => {
            if ctx.cancel_repair() {
                out.lines.push("Repair cancelled".to_string());
            } else {
                out.lines.push("No repair in progress".to_string());
            }
        }
        GameCommand::Systems => {
            for (system, durability, status) in ctx.systems() {
                out.lines
                    .push(format!("{system}: {durability}% ({status:?})"));
            }
        }
        GameCommand::Quit => {
            out.lines.push("Leaving the bunker".to_string());
        }
    }
    out
}

/// `Name xN` for a stack.
pub fn describe(stack: &ItemStack) -> String {
    match stack.item() {
        Some(item) => format!("{} x{}", item.name(), stack.count()),
        None => "nothing".to_string(),
    }
}

/// Comma-separated [`describe`] of every stack.
pub fn describe_all(stacks: &[ItemStack]) -> String {
    if stacks.is_empty() {
        return "nothing".to_string();
    }
    stacks.iter().map(describe).collect::<Vec<_>>().join(", ")
}

pub fn parse_command(input: &str, catalog: &ItemCatalog) -> Result<GameCommand, CommandError> {
    let input = input.trim();
    let input = input.strip_prefix('/').unwrap_or(input).trim();
    if input.is_empty() {
        return Ok(GameCommand::Help);
    }

    let mut parts = input.split_whitespace();
    let cmd = parts
        .next()
        .ok_or_else(|| CommandError::new("Missing command"))?
        .to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    match cmd.as_str() {
        "help" | "?" => Ok(GameCommand::Help),
        "give" | "take" | "has" => {
            if !(1..=2).contains(&args.len()) {
                return Err(CommandError::new(format!("Usage: /{cmd} <item> [count]")));
            }
            let item = parse_item(args[0], catalog)?;
            let count = match args.get(1) {
                Some(raw) => parse_positive_u32(raw)
                    .ok_or_else(|| CommandError::new(format!("Invalid {cmd} count")))?,
                None => 1,
            };
            let stack = ItemStack::new(item, count);
            Ok(match cmd.as_str() {
                "give" => GameCommand::Give { stack },
                "take" => GameCommand::Take { stack },
                _ => GameCommand::Has { stack },
            })
        }
        "set" => parse_set_command(&args, catalog),
        "move" | "mv" => {
            if args.len() != 4 {
                return Err(CommandError::new(
                    "Usage: /move <inventory> <slot> <inventory> <slot>",
                ));
            }
            Ok(GameCommand::Move {
                from: parse_slot(args[0], args[1])?,
                to: parse_slot(args[2], args[3])?,
            })
        }
        "list" | "ls" => match args.as_slice() {
            [] => Ok(GameCommand::List { inventory: None }),
            [name] => Ok(GameCommand::List {
                inventory: Some((*name).to_string()),
            }),
            _ => Err(CommandError::new("Usage: /list [inventory]")),
        },
        "repair" => {
            let [token] = args.as_slice() else {
                return Err(CommandError::new("Usage: /repair <system>"));
            };
            let system = BunkerSystemType::parse(token)
                .ok_or_else(|| CommandError::new(format!("Unknown system: {token}")))?;
            Ok(GameCommand::Repair { system })
        }
        "cancel" => Ok(GameCommand::Cancel),
        "systems" | "status" => Ok(GameCommand::Systems),
        "quit" | "exit" => Ok(GameCommand::Quit),
        _ => Err(CommandError::new(format!("Unknown command: {cmd}"))),
    }
}

fn parse_positive_u32(s: &str) -> Option<u32> {
    s.parse::<u32>().ok().filter(|v| *v > 0)
}

fn parse_slot(inventory: &str, slot: &str) -> Result<SlotArg, CommandError> {
    let slot = slot
        .parse::<usize>()
        .map_err(|_| CommandError::new(format!("Invalid slot index: {slot}")))?;
    Ok(SlotArg {
        inventory: inventory.to_string(),
        slot,
    })
}

/// Resolve an item by catalog key, or by display name with `_` for spaces.
fn parse_item(token: &str, catalog: &ItemCatalog) -> Result<Arc<Item>, CommandError> {
    catalog
        .get(token)
        .or_else(|| catalog.find_by_name(&token.replace('_', " ")))
        .cloned()
        .ok_or_else(|| CommandError::new(format!("Unknown item: {token}")))
}

fn parse_set_command(args: &[&str], catalog: &ItemCatalog) -> Result<GameCommand, CommandError> {
    if !(3..=4).contains(&args.len()) {
        return Err(CommandError::new(
            "Usage: /set <inventory> <slot> <item|empty> [count]",
        ));
    }
    let target = parse_slot(args[0], args[1])?;
    let stack = if args[2].eq_ignore_ascii_case("empty") {
        if args.len() == 4 {
            return Err(CommandError::new("An empty slot takes no count"));
        }
        ItemStack::empty()
    } else {
        let item = parse_item(args[2], catalog)?;
        let count = match args.get(3) {
            Some(raw) => {
                parse_positive_u32(raw).ok_or_else(|| CommandError::new("Invalid set count"))?
            }
            None => 1,
        };
        ItemStack::new(item, count)
    };
    Ok(GameCommand::Set { target, stack })
}

fn help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  /help".to_string(),
        "  /give <item> [count]        (into the backpack)".to_string(),
        "  /take <item> [count]        (out of the backpack)".to_string(),
        "  /has <item> [count]".to_string(),
        "  /set <inventory> <slot> <item|empty> [count]".to_string(),
        "  /move <inventory> <slot> <inventory> <slot>".to_string(),
        "  /list [inventory]".to_string(),
        "  /repair <system>            (air, water, power)".to_string(),
        "  /cancel                     (close the repair tray)".to_string(),
        "  /systems".to_string(),
        "  /quit".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunker_core::catalog_from_str;

    const PACK: &str = r#"[
        { "key": "bolt", "name": "Bolt", "stack_cap": 16 },
        { "key": "duct_tape", "name": "Duct Tape", "stack_cap": 8 }
    ]"#;

    #[derive(Default)]
    struct FakeCtx {
        backpack: Vec<ItemStack>,
        capacity: u32,
        moves: Vec<(SlotArg, SlotArg)>,
        spill: Option<ItemStack>,
        repairing: Option<BunkerSystemType>,
        alerts: Vec<Alert>,
    }

    impl FakeCtx {
        fn held(&self, stack: &ItemStack) -> u32 {
            self.backpack
                .iter()
                .filter(|s| s.same_item(stack))
                .map(ItemStack::count)
                .sum()
        }
    }

    impl CommandContext for FakeCtx {
        fn give(&mut self, stack: &ItemStack) -> u32 {
            let room = self.capacity.saturating_sub(self.backpack.iter().map(ItemStack::count).sum());
            let placed = stack.count().min(room);
            if placed > 0 {
                self.backpack.push(stack.with_count(placed));
            }
            stack.count() - placed
        }

        fn take(&mut self, stack: &ItemStack) -> u32 {
            self.backpack.retain(|s| !s.same_item(stack));
            0
        }

        fn backpack_has(&self, stack: &ItemStack) -> bool {
            self.held(stack) >= stack.count()
        }

        fn set_slot(&mut self, target: &SlotArg, stack: ItemStack) -> Result<u32, CommandError> {
            if target.inventory != "backpack" {
                return Err(CommandError::new(format!("Unknown inventory: {}", target.inventory)));
            }
            let kept = stack.count().min(10);
            self.backpack.push(stack.with_count(kept));
            Ok(stack.count() - kept)
        }

        fn transfer(&mut self, from: &SlotArg, to: &SlotArg) -> Result<TransferOutcome, CommandError> {
            self.moves.push((from.clone(), to.clone()));
            Ok(TransferOutcome {
                kind: TransferKind::Swapped,
                spill: self.spill.take().unwrap_or_default(),
            })
        }

        fn inventory_names(&self) -> Vec<String> {
            vec!["backpack".to_string(), "repair_tray".to_string()]
        }

        fn contents(&self, inventory: &str) -> Result<Vec<ItemStack>, CommandError> {
            match inventory {
                "backpack" => Ok(self.backpack.clone()),
                "repair_tray" => Ok(vec![ItemStack::empty()]),
                other => Err(CommandError::new(format!("Unknown inventory: {other}"))),
            }
        }

        fn open_repair(&mut self, system: BunkerSystemType) -> Result<Vec<ItemStack>, CommandError> {
            self.repairing = Some(system);
            Ok(Vec::new())
        }

        fn cancel_repair(&mut self) -> bool {
            self.repairing.take().is_some()
        }

        fn systems(&self) -> Vec<(BunkerSystemType, u32, SystemStatus)> {
            vec![(BunkerSystemType::AirFiltration, 60, SystemStatus::Damaged)]
        }

        fn alert(&mut self, alert: Alert) {
            self.alerts.push(alert);
        }
    }

    fn catalog() -> ItemCatalog {
        catalog_from_str(PACK).unwrap()
    }

    #[test]
    fn parses_items_by_key_or_name() {
        let catalog = catalog();
        let bolt = catalog.get("bolt").unwrap().clone();
        let tape = catalog.get("duct_tape").unwrap().clone();

        assert_eq!(
            parse_command("/give bolt 3", &catalog).unwrap(),
            GameCommand::Give {
                stack: ItemStack::new(bolt.clone(), 3)
            }
        );
        assert_eq!(
            parse_command("take bunker:bolt", &catalog).unwrap(),
            GameCommand::Take {
                stack: ItemStack::new(bolt, 1)
            }
        );
        assert_eq!(
            parse_command("has Duct_Tape 2", &catalog).unwrap(),
            GameCommand::Has {
                stack: ItemStack::new(tape, 2)
            }
        );
    }

    #[test]
    fn rejects_malformed_input() {
        let catalog = catalog();
        assert!(parse_command("/give rope", &catalog).is_err());
        assert!(parse_command("/give bolt 0", &catalog).is_err());
        assert!(parse_command("/move backpack 0 tray", &catalog).is_err());
        assert!(parse_command("/move backpack x tray 1", &catalog).is_err());
        assert!(parse_command("/set backpack 0 empty 3", &catalog).is_err());
        assert!(parse_command("/repair reactor", &catalog).is_err());
        assert!(parse_command("/dance", &catalog).is_err());
        assert_eq!(parse_command("   ", &catalog).unwrap(), GameCommand::Help);
    }

    #[test]
    fn parses_slot_commands() {
        let catalog = catalog();
        assert_eq!(
            parse_command("/move backpack 0 repair_tray 2", &catalog).unwrap(),
            GameCommand::Move {
                from: SlotArg {
                    inventory: "backpack".into(),
                    slot: 0
                },
                to: SlotArg {
                    inventory: "repair_tray".into(),
                    slot: 2
                },
            }
        );
        assert_eq!(
            parse_command("/set stash 1 empty", &catalog).unwrap(),
            GameCommand::Set {
                target: SlotArg {
                    inventory: "stash".into(),
                    slot: 1
                },
                stack: ItemStack::empty(),
            }
        );
        assert_eq!(
            parse_command("/repair water", &catalog).unwrap(),
            GameCommand::Repair {
                system: BunkerSystemType::WaterPurification
            }
        );
    }

    #[test]
    fn give_overflow_raises_alert() {
        let catalog = catalog();
        let mut ctx = FakeCtx {
            capacity: 5,
            ..Default::default()
        };
        let cmd = parse_command("/give bolt 8", &catalog).unwrap();
        let out = execute_command(&mut ctx, cmd);

        assert_eq!(out.lines, vec!["Gave 5x Bolt".to_string()]);
        assert_eq!(ctx.alerts.len(), 1);
        assert_eq!(
            ctx.alerts[0].message,
            "Backpack is full! Could not add 3x Bolt to backpack"
        );
        assert_eq!(ctx.alerts[0].kind, AlertKind::Failure);
    }

    #[test]
    fn spill_raises_warning() {
        let catalog = catalog();
        let bolt = catalog.get("bolt").unwrap().clone();
        let mut ctx = FakeCtx {
            spill: Some(ItemStack::new(bolt, 2)),
            ..Default::default()
        };
        let cmd = parse_command("/move backpack 0 repair_tray 0", &catalog).unwrap();
        let out = execute_command(&mut ctx, cmd);

        assert_eq!(
            out.lines,
            vec!["backpack[0] -> repair_tray[0]: swapped".to_string()]
        );
        assert_eq!(ctx.moves.len(), 1);
        assert_eq!(ctx.alerts[0].message, "No room for Bolt x2; dropped on the floor");
    }

    #[test]
    fn golden_command_session_outputs_are_stable() {
        let catalog = catalog();
        let mut ctx = FakeCtx {
            capacity: 20,
            ..Default::default()
        };

        let mut transcript = Vec::new();
        for input in [
            "/give bolt 4",
            "/has bolt 4",
            "/take duct_tape",
            "/set backpack 1 duct_tape 12",
            "/set locker 0 bolt",
            "/list",
            "/repair air",
            "/cancel",
            "/cancel",
            "/systems",
        ] {
            let cmd = parse_command(input, &catalog).unwrap();
            let out = execute_command(&mut ctx, cmd);
            transcript.extend(out.lines);
        }

        assert_eq!(
            transcript,
            vec![
                "Gave 4x Bolt".to_string(),
                "Backpack has Bolt x4".to_string(),
                "Error: backpack holds fewer than Duct Tape x1".to_string(),
                "Set backpack[1] to Duct Tape x10".to_string(),
                "2 did not fit".to_string(),
                "Error: Unknown inventory: locker".to_string(),
                "backpack (2 slots):".to_string(),
                "  [0] Bolt x4".to_string(),
                "  [1] Duct Tape x10".to_string(),
                "repair_tray (1 slots):".to_string(),
                "  (empty)".to_string(),
                "Repair tray ready for Air Filtration: needs nothing".to_string(),
                "Repair cancelled".to_string(),
                "No repair in progress".to_string(),
                "Air Filtration: 60% (Damaged)".to_string(),
            ]
        );
    }
}
