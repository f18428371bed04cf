#![warn(missing_docs)]
//! Test support for the bunker workspace: golden snapshots, a step-based
//! scenario harness, slot views and shared fixtures.

mod fixtures;
mod scenario;
mod slots;
mod snapshot;

pub use fixtures::*;
pub use scenario::*;
pub use slots::*;
pub use snapshot::*;
