//! Core intersection types: lanes, vehicle classes, vehicles.

use serde::{Deserialize, Serialize};

/// Number of approaches at the intersection.
pub const NUM_LANES: usize = 4;

/// One of the four intersection approaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneId {
    North,
    South,
    East,
    West,
}

impl LaneId {
    /// All lanes in wire order (0=North, 1=South, 2=East, 3=West).
    pub const ALL: [LaneId; NUM_LANES] = [LaneId::North, LaneId::South, LaneId::East, LaneId::West];

    /// Wire index of this lane.
    pub fn index(self) -> usize {
        match self {
            LaneId::North => 0,
            LaneId::South => 1,
            LaneId::East => 2,
            LaneId::West => 3,
        }
    }

    /// Lane for a wire index, if in range.
    pub fn from_index(index: usize) -> Option<LaneId> {
        LaneId::ALL.get(index).copied()
    }
}

impl std::fmt::Display for LaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaneId::North => write!(f, "NORTH"),
            LaneId::South => write!(f, "SOUTH"),
            LaneId::East => write!(f, "EAST"),
            LaneId::West => write!(f, "WEST"),
        }
    }
}

/// Vehicle classes. Everything except `Regular` is serviced as an emergency,
/// and all emergency classes schedule identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleClass {
    Regular,
    Ambulance,
    Police,
    FireTruck,
}

impl VehicleClass {
    /// Whether this class preempts regular traffic.
    pub fn is_priority(self) -> bool {
        !matches!(self, VehicleClass::Regular)
    }

    /// Wire code (0=Regular, 1=Ambulance, 2=Police, 3=FireTruck).
    pub fn code(self) -> u32 {
        match self {
            VehicleClass::Regular => 0,
            VehicleClass::Ambulance => 1,
            VehicleClass::Police => 2,
            VehicleClass::FireTruck => 3,
        }
    }

    /// Class for a wire code, if known.
    pub fn from_code(code: u32) -> Option<VehicleClass> {
        match code {
            0 => Some(VehicleClass::Regular),
            1 => Some(VehicleClass::Ambulance),
            2 => Some(VehicleClass::Police),
            3 => Some(VehicleClass::FireTruck),
            _ => None,
        }
    }

    /// Short display label.
    pub fn label(self) -> &'static str {
        match self {
            VehicleClass::Regular => "CAR",
            VehicleClass::Ambulance => "AMB",
            VehicleClass::Police => "POL",
            VehicleClass::FireTruck => "FIRE",
        }
    }
}

/// A vehicle waiting at (or crossing) the intersection.
///
/// `wait_score` starts at 0 and is only ever incremented by the aging pass;
/// every other field is immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u32,
    pub class: VehicleClass,
    pub lane: LaneId,
    /// Arrival timestamp, epoch seconds.
    pub arrival_time: i64,
    pub wait_score: u32,
}
