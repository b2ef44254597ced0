//! Background vehicle generator.
//!
//! Emits arrivals at randomized intervals onto random lanes, independently of
//! the controller. A full inbox drops the arrival on the producer side; the
//! controller never sees it and never retries it.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::domain::{LaneId, NUM_LANES, VehicleClass};
use crate::inbox::{ArrivalEvent, InboxError, InboxSender};

/// First id handed out by the generator. Interactive arrivals count from 1,
/// so the two sequences never collide on the dashboard.
pub const GENERATOR_ID_BASE: u32 = 1000;

/// Map a 0..100 roll onto a vehicle class using the configured percentage
/// slices: ambulances first, then police, then fire trucks, rest Regular.
pub fn class_for_roll(config: &GeneratorConfig, roll: u32) -> VehicleClass {
    if roll < config.ambulance_pct {
        VehicleClass::Ambulance
    } else if roll < config.ambulance_pct + config.police_pct {
        VehicleClass::Police
    } else if roll < config.ambulance_pct + config.police_pct + config.fire_truck_pct {
        VehicleClass::FireTruck
    } else {
        VehicleClass::Regular
    }
}

/// Independent producer task feeding the arrival inbox.
pub struct VehicleGenerator {
    config: GeneratorConfig,
    sender: InboxSender,
    shutdown: watch::Receiver<bool>,
    rng: StdRng,
    next_id: u32,
}

impl VehicleGenerator {
    /// `seed` fixes the RNG for reproducible runs; `None` seeds from the OS.
    pub fn new(config: GeneratorConfig, sender: InboxSender, shutdown: watch::Receiver<bool>, seed: Option<u64>) -> Self {
        debug!(?config, ?seed, "VehicleGenerator::new: called");
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            config,
            sender,
            shutdown,
            rng,
            next_id: GENERATOR_ID_BASE,
        }
    }

    /// Emit arrivals until the shutdown flag flips or the inbox closes.
    pub async fn run(mut self) {
        info!("Vehicle generator started");

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let lane = LaneId::ALL[self.rng.random_range(0..NUM_LANES)];
            let class = class_for_roll(&self.config, self.rng.random_range(0..100));
            let event = ArrivalEvent::new(self.next_id, lane, class);
            self.next_id += 1;

            match self.sender.enqueue(event) {
                Ok(()) => debug!(id = self.next_id - 1, %lane, ?class, "arrival emitted"),
                Err(InboxError::Full(id)) => warn!(id, "inbox full, arrival dropped"),
                Err(InboxError::Closed) => break,
            }

            let interval =
                Duration::from_millis(self.rng.random_range(self.config.min_interval_ms..=self.config.max_interval_ms));
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.shutdown.changed() => break,
            }
        }

        info!("Vehicle generator stopped");
    }
}
