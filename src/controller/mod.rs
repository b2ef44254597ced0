//! Intersection controller: the green-light state machine.
//!
//! Owns the four lane queues, drains the arrival inbox, runs the selection
//! policy, times green/emergency phases, applies preemption, and exposes
//! copy-out snapshots for rendering.

mod core;
mod snapshot;

pub use core::{Controller, ControllerHandle};
pub use snapshot::{ControllerStats, HISTORY_LIMIT, LaneSummary, Phase, Snapshot};
