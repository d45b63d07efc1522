/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarId(pub usize);

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "car#{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccupantId(pub u64);

impl fmt::Display for OccupantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "occupant#{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Stop,
}

impl Direction {
    /// Direction of travel needed to get from `from` to `to`.
    pub fn between(from: i32, to: i32) -> Direction {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Direction::Up,
            std::cmp::Ordering::Less => Direction::Down,
            std::cmp::Ordering::Equal => Direction::Stop,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarStatus {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "movingUp")]
    MovingUp,
    #[serde(rename = "movingDown")]
    MovingDown,
    #[serde(rename = "loading")]
    Loading,
    #[serde(rename = "maintenance")]
    Maintenance,
    #[serde(rename = "outOfService")]
    OutOfService,
}

impl CarStatus {
    pub fn is_moving(&self) -> bool {
        matches!(self, CarStatus::MovingUp | CarStatus::MovingDown)
    }

    /// Cars in an administrative state are never offered hall calls.
    pub fn is_in_service(&self) -> bool {
        !matches!(self, CarStatus::Maintenance | CarStatus::OutOfService)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestOrigin {
    /// Hall call from someone not yet aboard.
    External,
    /// Destination chosen by a boarded occupant.
    Internal,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Occupant {
    pub id: OccupantId,
    #[serde(rename = "destinationFloor")]
    pub destination_floor: i32,
    pub weight: f64,
}

impl Occupant {
    pub fn new(id: OccupantId, destination_floor: i32, weight: f64) -> Occupant {
        Occupant {
            id,
            destination_floor,
            weight,
        }
    }
}

/**
 * Read-only view of a car, published to collaborators after every state change.
 *
 * # Fields
 * - `current_floor`:       Last floor the car stopped at.
 * - `requested_floors`:    Pending stops in current service order.
 * - `cabin_position`:      Vertical cabin coordinate in metres.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarSnapshot {
    pub id: CarId,
    #[serde(rename = "currentFloor")]
    pub current_floor: i32,
    pub status: CarStatus,
    #[serde(rename = "doorsOpen")]
    pub doors_open: bool,
    #[serde(rename = "isMoving")]
    pub is_moving: bool,
    #[serde(rename = "requestedFloors")]
    pub requested_floors: Vec<i32>,
    #[serde(rename = "cabinPosition")]
    pub cabin_position: f64,
    pub occupants: usize,
    #[serde(rename = "currentWeight")]
    pub current_weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CarEvent {
    StateChanged(CarSnapshot),
    DoorsOpened {
        car: CarId,
        floor: i32,
    },
    ExitSignal {
        car: CarId,
        occupant: OccupantId,
        floor: i32,
    },
    DoorsClosed {
        car: CarId,
        floor: i32,
    },
    StopServed {
        car: CarId,
        floor: i32,
    },
}
