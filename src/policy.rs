//! Next-lane selection: strict priority first, round-robin fallback second.

use crate::domain::{LaneId, NUM_LANES};
use crate::lane::LaneQueue;

/// Choose the next lane to serve, or `None` when every lane is empty.
///
/// Both passes scan in round-robin order starting immediately after
/// `current` (the current lane itself is checked last, after the wrap), so
/// no single lane can monopolize service when several qualify:
///
/// 1. Priority pass: the first lane with a priority condition wins. If this
///    pass fails, no priority condition exists anywhere.
/// 2. Fallback pass: the first non-empty lane wins.
pub fn select_next(current: LaneId, queues: &[LaneQueue; NUM_LANES]) -> Option<LaneId> {
    for step in 1..=NUM_LANES {
        let lane = LaneId::ALL[(current.index() + step) % NUM_LANES];
        if queues[lane.index()].has_priority_condition() {
            return Some(lane);
        }
    }

    for step in 1..=NUM_LANES {
        let lane = LaneId::ALL[(current.index() + step) % NUM_LANES];
        if queues[lane.index()].count() > 0 {
            return Some(lane);
        }
    }

    None
}
