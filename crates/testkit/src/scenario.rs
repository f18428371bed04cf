//! Step-by-step scenario harness with golden snapshots.
//!
//! A scenario starts from some state, applies a fixed list of labelled
//! actions, and snapshots the state before the first action and after each
//! one. The resulting report is compared against a golden JSON file (or
//! rewritten when `BUNKER_UPDATE_SNAPSHOTS=1` is set).

use crate::snapshot::assert_json_snapshot;
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Scenario identity and golden location.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Name written into the report.
    pub name: String,
    /// Golden JSON path.
    pub snapshot_path: PathBuf,
}

/// One labelled action.
#[derive(Debug, Clone)]
pub struct ScenarioStep<A> {
    /// Label written into the report.
    pub label: String,
    /// Action handed to the apply function.
    pub action: A,
}

impl<A> ScenarioStep<A> {
    /// Label an action.
    pub fn new(label: impl Into<String>, action: A) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// State captured after a step.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioFrame<S, O> {
    /// Step label (`"initial"` for the starting frame).
    pub step: String,
    /// What the action returned, if anything ran.
    pub outcome: Option<O>,
    /// State after the step.
    pub snapshot: S,
}

#[derive(Debug, Clone, Serialize)]
struct ScenarioReport<S, O> {
    name: String,
    frames: Vec<ScenarioFrame<S, O>>,
}

/// Run every step against `state` and assert the report against the golden.
///
/// The report holds `steps.len() + 1` frames.
pub fn run_scenario<State, Action, Outcome, Snapshot, ApplyFn, SnapFn>(
    config: ScenarioConfig,
    mut state: State,
    steps: Vec<ScenarioStep<Action>>,
    mut apply: ApplyFn,
    mut snapshot: SnapFn,
) -> Result<()>
where
    Outcome: Serialize,
    Snapshot: Serialize,
    ApplyFn: FnMut(&mut State, Action) -> Outcome,
    SnapFn: FnMut(&State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(steps.len() + 1);
    frames.push(ScenarioFrame {
        step: "initial".to_string(),
        outcome: None,
        snapshot: snapshot(&state),
    });

    for step in steps {
        let outcome = apply(&mut state, step.action);
        frames.push(ScenarioFrame {
            step: step.label,
            outcome: Some(outcome),
            snapshot: snapshot(&state),
        });
    }

    let report = ScenarioReport {
        name: config.name,
        frames,
    };
    assert_json_snapshot(config.snapshot_path, &report)
}
