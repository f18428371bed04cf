//! Drag-and-drop resolution between two slots.
//!
//! A drop is resolved into a merge, a swap, or a partial fill with spill-back.
//! Every write goes through the containers' own `set_slot`/`add_stack`, and
//! the target is always written before the source so the target's remainder
//! decides what returns to the source.

use bunker_core::ItemStack;
use serde::Serialize;
use tracing::{debug, warn};

use crate::container::Container;

/// How a transfer was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    /// Same item in both slots: the target absorbed what it could.
    Merged,
    /// The slots exchanged contents.
    Swapped,
    /// The target took part of the dragged stack; the rest went back to the
    /// source and the target's old stack was re-added to the source inventory.
    SwappedWithSpillback,
    /// Nothing changed.
    Rejected,
}

/// Result of a transfer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Resolution taken.
    pub kind: TransferKind,
    /// Items that fit in neither inventory. The caller decides their fate.
    pub spill: ItemStack,
}

impl TransferOutcome {
    pub(crate) fn rejected() -> Self {
        Self::clean(TransferKind::Rejected)
    }

    fn clean(kind: TransferKind) -> Self {
        Self {
            kind,
            spill: ItemStack::empty(),
        }
    }

    /// Whether the transfer mutated anything.
    pub fn is_applied(&self) -> bool {
        self.kind != TransferKind::Rejected
    }
}

fn dragged<C: Container + ?Sized>(container: &C, index: usize) -> Option<ItemStack> {
    container
        .stack(index)
        .filter(|stack| !stack.is_empty())
        .cloned()
}

/// Move the stack in `source` onto `target` inside one container.
///
/// Containers that react to their own contents should call this through
/// [`Container::transfer_within`] so they observe only the finished move.
pub fn transfer_within<C: Container + ?Sized>(
    container: &mut C,
    source: usize,
    target: usize,
) -> TransferOutcome {
    if source == target {
        return TransferOutcome::rejected();
    }
    let Some(src) = dragged(&*container, source) else {
        return TransferOutcome::rejected();
    };
    let Some(tgt) = container.stack(target).cloned() else {
        return TransferOutcome::rejected();
    };

    if src.same_item(&tgt) {
        let remainder = merge_into(container, target, &src, &tgt);
        container.set_slot(source, src.with_count(remainder));
        debug!(inventory = container.name(), source, target, remainder, "merged within");
        return TransferOutcome::clean(TransferKind::Merged);
    }

    // Same container, same caps: a plain exchange always fits.
    let placed = container.set_slot(target, src);
    let returned = container.set_slot(source, tgt);
    debug_assert_eq!(placed + returned, 0, "swap within one container overflowed");
    debug!(inventory = container.name(), source, target, "swapped within");
    TransferOutcome::clean(TransferKind::Swapped)
}

/// Move the stack in `from[source]` onto `to[target]` across two containers.
pub fn transfer_between(
    from: &mut dyn Container,
    source: usize,
    to: &mut dyn Container,
    target: usize,
) -> TransferOutcome {
    let Some(src) = dragged(&*from, source) else {
        return TransferOutcome::rejected();
    };
    let Some(tgt) = to.stack(target).cloned() else {
        return TransferOutcome::rejected();
    };
    let accepted = src.item().is_some_and(|item| to.accepts(item));
    if !accepted {
        debug!(
            from = from.name(),
            to = to.name(),
            item = %src,
            "target refuses dragged item"
        );
        return TransferOutcome::rejected();
    }

    if src.same_item(&tgt) {
        let remainder = merge_into(to, target, &src, &tgt);
        from.set_slot(source, src.with_count(remainder));
        debug!(from = from.name(), to = to.name(), remainder, "merged across");
        return TransferOutcome::clean(TransferKind::Merged);
    }

    let remainder = to.set_slot(target, src.clone());
    if remainder == 0 {
        let leftover = place_displaced(from, source, &tgt);
        let outcome = TransferOutcome {
            kind: TransferKind::Swapped,
            spill: tgt.with_count(leftover),
        };
        report_spill(from.name(), to.name(), &outcome);
        return outcome;
    }

    // Partial accept: the dragged stack keeps priority over the target's old
    // contents.
    from.set_slot(source, src.with_count(remainder));
    let leftover = if tgt.is_empty() {
        0
    } else {
        from.add_stack(&tgt)
    };
    let outcome = TransferOutcome {
        kind: TransferKind::SwappedWithSpillback,
        spill: tgt.with_count(leftover),
    };
    debug!(
        from = from.name(),
        to = to.name(),
        returned = remainder,
        "partial accept"
    );
    report_spill(from.name(), to.name(), &outcome);
    outcome
}

/// Write `tgt + src` into `container[target]`, returning what did not fit.
fn merge_into<C: Container + ?Sized>(
    container: &mut C,
    target: usize,
    src: &ItemStack,
    tgt: &ItemStack,
) -> u32 {
    let total = u64::from(tgt.count()) + u64::from(src.count());
    let kept = u32::try_from(total).unwrap_or(u32::MAX);
    let overflow = u32::try_from(total - u64::from(kept)).unwrap_or(u32::MAX);
    container
        .set_slot(target, src.with_count(kept))
        .saturating_add(overflow)
}

/// Put the target's previous stack into the vacated source slot, spreading
/// whatever that slot cannot hold over the rest of the source container.
fn place_displaced(from: &mut dyn Container, source: usize, displaced: &ItemStack) -> u32 {
    let Some(item) = displaced.item() else {
        from.set_slot(source, ItemStack::empty());
        return 0;
    };
    let leftover = if from.accepts(item) {
        from.set_slot(source, displaced.clone())
    } else {
        from.set_slot(source, ItemStack::empty());
        displaced.count()
    };
    if leftover == 0 {
        return 0;
    }
    from.add_stack(&displaced.with_count(leftover))
}

fn report_spill(from: &str, to: &str, outcome: &TransferOutcome) {
    if !outcome.spill.is_empty() {
        warn!(from, to, spill = %outcome.spill, "transfer spilled items");
    }
}
