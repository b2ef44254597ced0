//! Bounded, non-blocking arrival mailbox between producers and the controller.
//!
//! Producers (the background generator and the interactive input surface) hold
//! cloneable [`InboxSender`] handles and enqueue wire-level [`ArrivalEvent`]s;
//! the controller owns the single [`ArrivalInbox`] read half and drains it
//! without blocking. A full inbox fails the producer-side enqueue — the event
//! is dropped, never retried by the controller.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{LaneId, Vehicle, VehicleClass};

/// Default pending-arrival capacity, matching the transport the intersection
/// was sized for.
pub const DEFAULT_INBOX_CAPACITY: usize = 10;

/// Wire-level arrival record. Lane and class travel as raw codes and are
/// validated on decode, before anything reaches a lane queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalEvent {
    pub id: u32,
    /// Lane code in [0,3] (0=North, 1=South, 2=East, 3=West).
    pub lane: u32,
    /// Class code (0=Regular, 1=Ambulance, 2=Police, 3=FireTruck).
    pub class: u32,
    /// Epoch seconds.
    pub timestamp: i64,
}

impl ArrivalEvent {
    /// Build an event stamped with the current wall clock.
    pub fn new(id: u32, lane: LaneId, class: VehicleClass) -> Self {
        Self {
            id,
            lane: lane.index() as u32,
            class: class.code(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Validate the wire codes and produce a queueable vehicle.
    pub fn decode(&self) -> Result<Vehicle, DecodeError> {
        let lane = LaneId::from_index(self.lane as usize).ok_or(DecodeError::BadLane(self.lane))?;
        let class = VehicleClass::from_code(self.class).ok_or(DecodeError::BadClass(self.class))?;

        Ok(Vehicle {
            id: self.id,
            class,
            lane,
            arrival_time: self.timestamp,
            wait_score: 0,
        })
    }
}

/// Producer-side enqueue failures.
#[derive(Debug, Error)]
pub enum InboxError {
    #[error("inbox full, arrival {0} dropped")]
    Full(u32),

    #[error("inbox closed")]
    Closed,
}

/// Malformed wire events, rejected before reaching the controller's queues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("lane code {0} out of range")]
    BadLane(u32),

    #[error("unknown vehicle class code {0}")]
    BadClass(u32),
}

/// Write half of the inbox. Cloneable; one per producer.
#[derive(Clone)]
pub struct InboxSender {
    tx: mpsc::Sender<ArrivalEvent>,
}

impl InboxSender {
    /// Enqueue an arrival without blocking. Fails with [`InboxError::Full`]
    /// when the capacity is exhausted.
    pub fn enqueue(&self, event: ArrivalEvent) -> Result<(), InboxError> {
        debug!(id = event.id, lane = event.lane, "InboxSender::enqueue: called");
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(ev) => InboxError::Full(ev.id),
            mpsc::error::TrySendError::Closed(_) => InboxError::Closed,
        })
    }
}

/// Read half of the inbox. Owned by the controller, the sole consumer.
pub struct ArrivalInbox {
    rx: mpsc::Receiver<ArrivalEvent>,
}

impl ArrivalInbox {
    /// Drain every pending event without blocking. The sequence is lazy and
    /// finite; an empty inbox yields nothing, which is a normal outcome and
    /// not an error. FIFO is preserved per sender.
    pub fn drain_all(&mut self) -> impl Iterator<Item = ArrivalEvent> + '_ {
        std::iter::from_fn(|| self.rx.try_recv().ok())
    }
}

/// Create a bounded inbox with the given capacity.
pub fn channel(capacity: usize) -> (InboxSender, ArrivalInbox) {
    debug!(capacity, "inbox::channel: called");
    let (tx, rx) = mpsc::channel(capacity);
    (InboxSender { tx }, ArrivalInbox { rx })
}
