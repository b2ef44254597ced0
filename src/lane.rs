//! Per-approach vehicle queues with priority-aware removal and aging.

use std::collections::VecDeque;

use crate::domain::Vehicle;

/// Wait score at which a Regular vehicle flags its lane for priority
/// selection. Aging earns the lane the next green, not a better position
/// within the lane — removal order among regulars stays FIFO.
pub const AGING_THRESHOLD: u32 = 10;

/// An ordered queue of waiting vehicles for one approach.
///
/// Arrival order is preserved except for priority removal: an emergency-class
/// vehicle anywhere in the queue is served before any regular ahead of it.
#[derive(Debug, Clone, Default)]
pub struct LaneQueue {
    vehicles: VecDeque<Vehicle>,
}

impl LaneQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tail insert. Never fails.
    pub fn append(&mut self, vehicle: Vehicle) {
        self.vehicles.push_back(vehicle);
    }

    /// Priority-aware pop: the first emergency-class vehicle from the head
    /// wins (FIFO among emergencies); with none queued, plain FIFO. `None`
    /// on an empty queue.
    pub fn remove_next(&mut self) -> Option<Vehicle> {
        let position = self
            .vehicles
            .iter()
            .position(|v| v.class.is_priority())
            .unwrap_or(0);
        self.vehicles.remove(position)
    }

    /// Increment the wait score of every queued Regular vehicle by one.
    /// Called once per service tick on all four lanes — the anti-starvation
    /// mechanism.
    pub fn age(&mut self) {
        for vehicle in self.vehicles.iter_mut() {
            if !vehicle.class.is_priority() {
                vehicle.wait_score += 1;
            }
        }
    }

    /// True iff any queued vehicle is emergency-class or has aged past
    /// [`AGING_THRESHOLD`]. Lane-level only: it influences which lane is
    /// selected, never the removal order inside the lane.
    pub fn has_priority_condition(&self) -> bool {
        self.vehicles
            .iter()
            .any(|v| v.class.is_priority() || v.wait_score >= AGING_THRESHOLD)
    }

    pub fn count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Head-to-tail iteration, for snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }
}
