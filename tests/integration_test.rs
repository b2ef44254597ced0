//! Integration tests for trafficd
//!
//! These tests drive the full controller state machine with near-zero
//! timing values so whole phase cycles run in milliseconds.

use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use trafficd::config::TimingConfig;
use trafficd::controller::{Controller, ControllerHandle, Phase, Snapshot};
use trafficd::domain::{LaneId, VehicleClass};
use trafficd::inbox::{self, ArrivalEvent, InboxSender};

fn fast_timing() -> TimingConfig {
    TimingConfig {
        green_duration_ms: 60,
        crossing_ms: 2,
        all_red_ms: 2,
        idle_poll_ms: 1,
    }
}

fn spawn_controller(timing: TimingConfig) -> (InboxSender, ControllerHandle, watch::Sender<bool>, JoinHandle<()>) {
    let (sender, arrivals) = inbox::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let controller = Controller::new(timing, arrivals, shutdown_rx);
    let handle = controller.handle();
    let task = tokio::spawn(controller.run());

    (sender, handle, shutdown_tx, task)
}

/// Poll snapshots until the predicate holds or the timeout expires.
async fn wait_for<F>(handle: &ControllerHandle, timeout: Duration, pred: F) -> Snapshot
where
    F: Fn(&Snapshot) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        let snap = handle.snapshot().await;
        if pred(&snap) {
            return snap;
        }
        assert!(
            Instant::now() < deadline,
            "condition not reached within {timeout:?}; last snapshot: {snap:?}"
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

fn arrival(id: u32, lane: LaneId, class: VehicleClass) -> ArrivalEvent {
    ArrivalEvent::new(id, lane, class)
}

// =============================================================================
// Scenario tests
// =============================================================================

#[tokio::test]
async fn test_single_arrival_is_served_then_all_red() {
    let (sender, handle, shutdown_tx, task) = spawn_controller(fast_timing());

    sender.enqueue(arrival(1, LaneId::North, VehicleClass::Regular)).unwrap();

    let snap = wait_for(&handle, Duration::from_secs(2), |s| {
        s.stats.total_served == 1 && s.phase == Phase::AllRed
    })
    .await;

    assert_eq!(snap.history.len(), 1);
    assert_eq!(snap.history[0].id, 1);
    assert_eq!(snap.served_lane, None);
    assert!(snap.crossing.is_none());
    assert!(snap.lanes.iter().all(|l| l.count() == 0));
    assert_eq!(snap.stats.emergency_served, 0);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_ambulance_lane_is_served_before_longer_regular_queue() {
    let (sender, handle, shutdown_tx, task) = spawn_controller(fast_timing());

    // Three regulars on North, one ambulance on South. Despite North's
    // bigger queue, South must be served first.
    sender.enqueue(arrival(1, LaneId::North, VehicleClass::Regular)).unwrap();
    sender.enqueue(arrival(2, LaneId::North, VehicleClass::Regular)).unwrap();
    sender.enqueue(arrival(3, LaneId::North, VehicleClass::Regular)).unwrap();
    sender.enqueue(arrival(99, LaneId::South, VehicleClass::Ambulance)).unwrap();

    let snap = wait_for(&handle, Duration::from_secs(2), |s| s.stats.total_served == 4).await;

    // History is newest first, so the first vehicle served is the last entry.
    assert_eq!(snap.history.last().unwrap().id, 99);
    assert_eq!(snap.stats.emergency_served, 1);
    assert_eq!(snap.stats.preemptions, 0);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_mid_phase_ambulance_preempts_normal_green() {
    // Long green, slow crossings: North cannot drain before the ambulance
    // arrives mid-phase.
    let timing = TimingConfig {
        green_duration_ms: 1_000,
        crossing_ms: 30,
        all_red_ms: 1,
        idle_poll_ms: 1,
    };
    let (sender, handle, shutdown_tx, task) = spawn_controller(timing);

    for id in 1..=6 {
        sender.enqueue(arrival(id, LaneId::North, VehicleClass::Regular)).unwrap();
    }

    // Wait until the North green is underway, then spring the emergency.
    wait_for(&handle, Duration::from_secs(2), |s| s.stats.total_served >= 1).await;
    sender.enqueue(arrival(77, LaneId::East, VehicleClass::Ambulance)).unwrap();

    let snap = wait_for(&handle, Duration::from_secs(3), |s| {
        s.history.iter().any(|v| v.id == 77)
    })
    .await;

    // The green budget was forfeited: remaining North regulars are still
    // queued when the ambulance completes, and a preemption was recorded.
    assert!(snap.stats.preemptions >= 1);
    assert!(snap.lanes[LaneId::North.index()].count() >= 3);
    assert_eq!(snap.history[0].id, 77);
    assert_eq!(snap.stats.emergency_served, 1);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
}

// =============================================================================
// Emergency rotation
// =============================================================================

#[tokio::test]
async fn test_simultaneous_emergencies_rotate_round_robin() {
    let (sender, handle, shutdown_tx, task) = spawn_controller(fast_timing());

    // Two ambulances on South, one on East. Emergency service is strictly
    // one vehicle per activation, so the lanes must alternate instead of
    // South draining fully first.
    sender.enqueue(arrival(10, LaneId::South, VehicleClass::Ambulance)).unwrap();
    sender.enqueue(arrival(11, LaneId::South, VehicleClass::Ambulance)).unwrap();
    sender.enqueue(arrival(20, LaneId::East, VehicleClass::Ambulance)).unwrap();

    let snap = wait_for(&handle, Duration::from_secs(2), |s| s.stats.total_served == 3).await;

    let served_order: Vec<u32> = snap.history.iter().rev().map(|v| v.id).collect();
    assert_eq!(served_order, vec![10, 20, 11]);
    assert_eq!(snap.stats.emergency_served, 3);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
}

// =============================================================================
// Aging
// =============================================================================

#[tokio::test]
async fn test_starved_lane_earns_service_through_aging() {
    // A single West regular behind a long North queue. Each North service
    // tick ages West; at the threshold West wins priority selection even
    // though it holds no emergency vehicle.
    let timing = TimingConfig {
        green_duration_ms: 5_000,
        crossing_ms: 5,
        all_red_ms: 1,
        idle_poll_ms: 1,
    };
    let (sender, handle, shutdown_tx, task) = spawn_controller(timing);

    for id in 1..=12 {
        sender.enqueue(arrival(id, LaneId::North, VehicleClass::Regular)).unwrap();
    }
    sender.enqueue(arrival(50, LaneId::West, VehicleClass::Regular)).unwrap();

    let snap = wait_for(&handle, Duration::from_secs(3), |s| {
        s.history.iter().any(|v| v.id == 50)
    })
    .await;

    // West was served while North still had vehicles waiting, which is only
    // possible via the aging flag interrupting North's green.
    assert!(snap.lanes[LaneId::North.index()].count() >= 1);
    assert!(snap.stats.preemptions >= 1);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
}

// =============================================================================
// Idle and shutdown behavior
// =============================================================================

#[tokio::test]
async fn test_empty_intersection_idles_without_service() {
    let (_sender, handle, shutdown_tx, task) = spawn_controller(fast_timing());

    tokio::time::sleep(Duration::from_millis(50)).await;

    let snap = handle.snapshot().await;
    assert_eq!(snap.stats.total_served, 0);
    assert_eq!(snap.phase, Phase::AllRed);
    assert_eq!(snap.served_lane, None);
    assert!(snap.crossing.is_none());
    assert!(snap.history.is_empty());

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_controller_stops_on_shutdown_flag() {
    let (sender, handle, shutdown_tx, task) = spawn_controller(fast_timing());

    sender.enqueue(arrival(1, LaneId::East, VehicleClass::Regular)).unwrap();
    wait_for(&handle, Duration::from_secs(2), |s| s.stats.total_served == 1).await;

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("controller should exit promptly after shutdown")
        .unwrap();
}

#[tokio::test]
async fn test_arrivals_after_start_are_picked_up() {
    let (sender, handle, shutdown_tx, task) = spawn_controller(fast_timing());

    // Let the controller reach its idle loop first.
    tokio::time::sleep(Duration::from_millis(20)).await;

    sender.enqueue(arrival(5, LaneId::West, VehicleClass::Regular)).unwrap();

    let snap = wait_for(&handle, Duration::from_secs(2), |s| s.stats.total_served == 1).await;
    assert_eq!(snap.history[0].id, 5);
    assert_eq!(snap.history[0].lane, LaneId::West);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
}
