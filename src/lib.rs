//! Trafficd - a four-way signalized intersection scheduler
//!
//! Trafficd models one signalized intersection that decides, continuously and
//! in real time, which approach gets right-of-way. Emergency vehicles take
//! strict priority; ordinary traffic is protected from starvation by an aging
//! rule that flags long-waiting lanes for the next green.
//!
//! # Core Concepts
//!
//! - **One Writer**: a single controller task owns the lane queues and phase
//!   state; producers only touch the bounded arrival inbox
//! - **Priority Beats Fairness**: emergency classes always win selection, and
//!   preempt an in-progress normal green
//! - **Aging Flags Lanes, Not Cars**: a starved regular earns its *lane* the
//!   next green while in-lane order stays FIFO
//! - **Named Delays**: every real-time wait is a config value, so tests run
//!   the full state machine in milliseconds
//!
//! # Modules
//!
//! - [`inbox`] - bounded, non-blocking arrival mailbox
//! - [`lane`] - per-approach queues with priority removal and aging
//! - [`policy`] - next-lane selection
//! - [`controller`] - the green-light state machine
//! - [`producer`] - background vehicle generator
//! - [`tui`] - live terminal dashboard and interactive input
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod controller;
pub mod domain;
pub mod inbox;
pub mod lane;
pub mod policy;
pub mod producer;
pub mod tui;

// Re-export commonly used types
pub use config::{Config, GeneratorConfig, InboxConfig, TimingConfig};
pub use controller::{Controller, ControllerHandle, ControllerStats, HISTORY_LIMIT, LaneSummary, Phase, Snapshot};
pub use domain::{LaneId, NUM_LANES, Vehicle, VehicleClass};
pub use inbox::{ArrivalEvent, ArrivalInbox, DecodeError, InboxError, InboxSender};
pub use lane::{AGING_THRESHOLD, LaneQueue};
pub use policy::select_next;
pub use producer::VehicleGenerator;
