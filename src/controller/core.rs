//! The intersection control loop.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, watch};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::TimingConfig;
use crate::domain::{LaneId, NUM_LANES, Vehicle};
use crate::inbox::ArrivalInbox;
use crate::lane::LaneQueue;
use crate::policy::select_next;

use super::snapshot::{ControllerStats, HISTORY_LIMIT, LaneSummary, Phase, Snapshot};

/// Everything shared with snapshot readers, guarded by the single lock.
/// The controller is the sole writer; the renderer only copies out.
struct IntersectionState {
    lanes: [LaneQueue; NUM_LANES],
    served_lane: Option<LaneId>,
    phase: Phase,
    crossing: Option<Vehicle>,
    history: VecDeque<Vehicle>,
    stats: ControllerStats,
}

impl IntersectionState {
    fn new() -> Self {
        Self {
            lanes: std::array::from_fn(|_| LaneQueue::new()),
            served_lane: None,
            phase: Phase::AllRed,
            crossing: None,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            stats: ControllerStats::default(),
        }
    }

    fn any_priority(&self) -> bool {
        self.lanes.iter().any(|q| q.has_priority_condition())
    }

    fn record_completed(&mut self, vehicle: Vehicle) {
        self.history.push_front(vehicle);
        self.history.truncate(HISTORY_LIMIT);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            lanes: LaneId::ALL.map(|lane| {
                let queue = &self.lanes[lane.index()];
                LaneSummary {
                    lane,
                    vehicles: queue.iter().cloned().collect(),
                    priority: queue.has_priority_condition(),
                }
            }),
            served_lane: self.served_lane,
            phase: self.phase,
            crossing: self.crossing.clone(),
            history: self.history.iter().cloned().collect(),
            stats: self.stats.clone(),
        }
    }
}

/// Outcome of one inner service tick, decided under the lock.
enum Tick {
    /// A priority condition appeared somewhere; forfeit the green budget.
    Preempted,
    /// A vehicle was removed and is now crossing.
    Crossing(Vehicle),
    /// The served lane ran dry.
    Empty,
}

/// Cloneable read handle for renderers and tests.
#[derive(Clone)]
pub struct ControllerHandle {
    state: Arc<Mutex<IntersectionState>>,
}

impl ControllerHandle {
    /// Copy the current intersection state out under the lock.
    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.snapshot()
    }
}

/// The intersection controller. Exactly one instance exists per process; it
/// is the sole writer of the lane queues and intersection state.
pub struct Controller {
    timing: TimingConfig,
    inbox: ArrivalInbox,
    state: Arc<Mutex<IntersectionState>>,
    shutdown: watch::Receiver<bool>,
    current_lane: LaneId,
}

impl Controller {
    pub fn new(timing: TimingConfig, inbox: ArrivalInbox, shutdown: watch::Receiver<bool>) -> Self {
        debug!(?timing, "Controller::new: called");
        Self {
            timing,
            inbox,
            state: Arc::new(Mutex::new(IntersectionState::new())),
            shutdown,
            current_lane: LaneId::North,
        }
    }

    /// Create a read handle. May be called any number of times before or
    /// after the controller task starts.
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Drain the inbox into the lane queues. Decode failures are logged and
    /// dropped; they never reach a queue.
    async fn drain_inbox(&mut self) {
        let events: Vec<_> = self.inbox.drain_all().collect();
        if events.is_empty() {
            return;
        }

        let mut state = self.state.lock().await;
        for event in events {
            match event.decode() {
                Ok(vehicle) => {
                    debug!(id = vehicle.id, lane = %vehicle.lane, class = ?vehicle.class, "arrival queued");
                    state.lanes[vehicle.lane.index()].append(vehicle);
                }
                Err(e) => {
                    state.stats.decode_failures += 1;
                    warn!(id = event.id, error = %e, "dropping undecodable arrival");
                }
            }
        }
    }

    /// Run the control loop until the shutdown flag flips. An in-flight
    /// crossing always completes; no new phase starts after shutdown.
    pub async fn run(mut self) {
        info!("Controller started");

        while !self.shutting_down() {
            self.drain_inbox().await;

            // Selection and the emergency-mode decision happen under one
            // lock acquisition, so the phase matches the queues as they
            // were at selection time.
            let selected = {
                let mut state = self.state.lock().await;
                match select_next(self.current_lane, &state.lanes) {
                    Some(lane) => {
                        let emergency = state.lanes[lane.index()].has_priority_condition();
                        state.served_lane = Some(lane);
                        state.phase = if emergency { Phase::EmergencyGreen } else { Phase::Green };
                        Some((lane, emergency))
                    }
                    None => {
                        state.served_lane = None;
                        state.phase = Phase::AllRed;
                        None
                    }
                }
            };

            let Some((lane, emergency)) = selected else {
                // Intersection idles; wait for arrivals.
                sleep(self.timing.idle_poll()).await;
                continue;
            };

            self.current_lane = lane;
            debug!(%lane, emergency, "green phase start");

            self.serve_lane(lane, emergency).await;

            // Mandatory all-stop gap before the next phase.
            {
                let mut state = self.state.lock().await;
                state.served_lane = None;
                state.phase = Phase::AllRed;
                state.crossing = None;
            }
            if self.shutting_down() {
                break;
            }
            sleep(self.timing.all_red_time()).await;
        }

        info!("Controller stopped");
    }

    /// Inner tick loop for one green or emergency phase.
    async fn serve_lane(&mut self, lane: LaneId, emergency: bool) {
        let green_start = Instant::now();

        // Emergency service ignores the clock: it always runs at least one
        // tick and breaks after a single vehicle.
        while emergency || green_start.elapsed() < self.timing.green_duration() {
            if self.shutting_down() {
                break;
            }

            // New arrivals must be visible to the preemption check below.
            self.drain_inbox().await;

            let tick = {
                let mut state = self.state.lock().await;
                if !emergency && state.any_priority() {
                    state.stats.preemptions += 1;
                    Tick::Preempted
                } else {
                    match state.lanes[lane.index()].remove_next() {
                        Some(vehicle) => {
                            // One service tick ages every lane, not just
                            // the served one.
                            for queue in state.lanes.iter_mut() {
                                queue.age();
                            }
                            state.crossing = Some(vehicle.clone());
                            Tick::Crossing(vehicle)
                        }
                        None => Tick::Empty,
                    }
                }
            };

            match tick {
                Tick::Preempted => {
                    debug!(%lane, "green phase preempted");
                    break;
                }
                Tick::Empty => break,
                Tick::Crossing(vehicle) => {
                    debug!(id = vehicle.id, %lane, "vehicle crossing");
                    // Simulated road occupancy. The lock is never held
                    // across this delay.
                    sleep(self.timing.crossing_time()).await;

                    let mut state = self.state.lock().await;
                    state.crossing = None;
                    state.stats.total_served += 1;
                    if emergency {
                        state.stats.emergency_served += 1;
                    }
                    state.record_completed(vehicle);
                }
            }

            // Strictly one vehicle per emergency activation, then
            // re-arbitrate so simultaneous emergencies rotate fairly.
            if emergency {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VehicleClass;

    fn vehicle(id: u32, lane: LaneId, class: VehicleClass) -> Vehicle {
        Vehicle {
            id,
            class,
            lane,
            arrival_time: 0,
            wait_score: 0,
        }
    }

    #[test]
    fn test_history_is_bounded_and_newest_first() {
        let mut state = IntersectionState::new();
        for id in 1..=8 {
            state.record_completed(vehicle(id, LaneId::North, VehicleClass::Regular));
        }

        let ids: Vec<u32> = state.history.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![8, 7, 6, 5, 4]);
    }

    #[test]
    fn test_any_priority_scans_all_lanes() {
        let mut state = IntersectionState::new();
        assert!(!state.any_priority());

        state.lanes[LaneId::West.index()].append(vehicle(1, LaneId::West, VehicleClass::Police));
        assert!(state.any_priority());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut state = IntersectionState::new();
        state.lanes[LaneId::East.index()].append(vehicle(1, LaneId::East, VehicleClass::Regular));

        let snap = state.snapshot();
        state.lanes[LaneId::East.index()].remove_next();

        // The snapshot kept its own copy of the queue contents.
        assert_eq!(snap.lanes[LaneId::East.index()].count(), 1);
        assert_eq!(snap.lanes[LaneId::East.index()].vehicles[0].id, 1);
        assert!(state.lanes[LaneId::East.index()].is_empty());
    }

    #[tokio::test]
    async fn test_handle_snapshot_reflects_initial_state() {
        let (_tx, rx) = crate::inbox::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let controller = Controller::new(TimingConfig::default(), rx, shutdown_rx);

        let snap = controller.handle().snapshot().await;
        assert_eq!(snap.phase, Phase::AllRed);
        assert_eq!(snap.served_lane, None);
        assert!(snap.crossing.is_none());
        assert!(snap.history.is_empty());
        assert!(snap.lanes.iter().all(|l| l.count() == 0));
    }
}
