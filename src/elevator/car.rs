/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, trace, warn};
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{BuildingConfig, CarConfig};
use crate::elevator::request_queue::RequestQueue;
use crate::shared::{
    CarEvent, CarId, CarSnapshot, CarStatus, Direction, Occupant, OccupantId, RequestOrigin,
};

/***************************************/
/*               Errors                */
/***************************************/
#[derive(Debug, Error, PartialEq)]
pub enum CarError {
    #[error("floor {floor} is outside [0, {top_floor}]")]
    FloorOutOfRange { floor: i32, top_floor: i32 },

    #[error("{0} is already aboard")]
    DuplicateOccupant(OccupantId),

    #[error("{0} is not aboard")]
    UnknownOccupant(OccupantId),

    #[error("car is full ({capacity} occupants)")]
    CapacityExceeded { capacity: usize },

    #[error("boarding would load {attempted} kg, limit is {max_weight} kg")]
    WeightExceeded { attempted: f64, max_weight: f64 },

    #[error("{0} cannot change service state while moving")]
    InTransit(CarId),
}

/***************************************/
/*               Enums                 */
/***************************************/

// Pending transition and the clock time at which it completes
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Moving { target: i32 },
    DoorsOpening { until: f64 },
    DoorsOpen { until: f64 },
    DoorsClosing { until: f64 },
    Suspended,
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * One elevator cabin: its stop queue, doors, occupants and motion.
 *
 * The car never blocks. Every delay (door travel, dwell, motion) is a deadline stored in
 * the current phase and checked by `advance`, which the owner calls once per tick.
 *
 * # Fields
 * - `event_tx`:        Observer channel for door, exit and state notifications.
 * - `behind`:          Requests for the floor the car is leaving, queued on arrival.
 * - `signaled`:        Occupants already told to exit while stationary at this floor.
 * - `clock`:           Seconds of simulated time this car has been advanced.
 * - `ticks`:           Number of `advance` calls, drives the watchdog.
 */
pub struct Car {
    id: CarId,
    config: CarConfig,
    top_floor: i32,
    floor_height: f64,
    event_tx: cbc::Sender<CarEvent>,

    current_floor: i32,
    position: f64,
    status: CarStatus,
    doors_open: bool,
    queue: RequestQueue,
    behind: RequestQueue,
    occupants: Vec<Occupant>,
    current_weight: f64,
    signaled: Vec<OccupantId>,

    phase: Phase,
    clock: f64,
    ticks: u64,
}

impl Car {
    pub fn new(
        id: CarId,
        config: &CarConfig,
        building: &BuildingConfig,
        event_tx: cbc::Sender<CarEvent>,
    ) -> Car {
        Car {
            id,
            config: config.clone(),
            top_floor: building.top_floor,
            floor_height: building.floor_height,
            event_tx,
            current_floor: 0,
            position: 0.0,
            status: CarStatus::Idle,
            doors_open: false,
            queue: RequestQueue::new(),
            behind: RequestQueue::new(),
            occupants: Vec::new(),
            current_weight: 0.0,
            signaled: Vec::new(),
            phase: Phase::Idle,
            clock: 0.0,
            ticks: 0,
        }
    }

    /// Parks the car at `floor` (clamped to the building) before the simulation starts.
    pub fn at_floor(mut self, floor: i32) -> Car {
        self.current_floor = floor.clamp(0, self.top_floor);
        self.position = self.floor_coordinate(self.current_floor);
        self
    }

    pub fn request_floor(&mut self, floor: i32, origin: RequestOrigin) -> Result<(), CarError> {
        if floor < 0 || floor > self.top_floor {
            warn!("{}: rejected request for floor {}", self.id, floor);
            return Err(CarError::FloorOutOfRange {
                floor,
                top_floor: self.top_floor,
            });
        }

        // Doors already open here, hold them instead of queueing a second visit
        if floor == self.current_floor {
            match self.phase {
                Phase::DoorsOpen { .. } => {
                    debug!("{}: holding doors at floor {}", self.id, floor);
                    self.phase = Phase::DoorsOpen {
                        until: self.clock + self.config.dwell_time,
                    };
                    return Ok(());
                }
                Phase::DoorsOpening { .. } => return Ok(()),
                _ => {}
            }
        }

        if self.status.is_moving() && floor == self.current_floor {
            debug!("{}: floor {} held until the next arrival", self.id, floor);
            self.behind.push(floor, origin);
            self.publish_state();
            return Ok(());
        }

        if !self.queue.push(floor, origin) {
            debug!("{}: floor {} already queued", self.id, floor);
        }

        if self.phase == Phase::Idle {
            if floor == self.current_floor && !self.doors_open {
                self.queue.remove(floor);
                self.serve_current_floor();
            } else {
                self.process_queue();
            }
        }

        self.publish_state();
        Ok(())
    }

    /// Hall call: an external request for `floor`.
    pub fn call_to_floor(&mut self, floor: i32) -> Result<(), CarError> {
        self.request_floor(floor, RequestOrigin::External)
    }

    /**
     * Withdraws one hall call for `floor`.
     *
     * The stop stays queued while it is still needed: another hall call is waiting there,
     * a boarded occupant asked for it, or someone aboard is headed there. Returns true if the
     * stop was removed.
     */
    pub fn cancel_hall_call(&mut self, floor: i32) -> bool {
        let needed_by_occupant = self.occupants.iter().any(|o| o.destination_floor == floor);
        let queue = if self.queue.contains(floor) {
            &mut self.queue
        } else {
            &mut self.behind
        };

        let remaining = match queue.release_hall_call(floor) {
            Some(remaining) => remaining,
            None => return false,
        };
        let requested_inside = queue.stop(floor).map_or(false, |s| s.internal);

        if remaining == 0 && !requested_inside && !needed_by_occupant {
            queue.remove(floor);
            debug!("{}: hall call at floor {} withdrawn", self.id, floor);
            self.publish_state();
            return true;
        }
        false
    }

    pub fn can_enter(&self, occupant: &Occupant) -> bool {
        self.doors_open
            && self.occupants.len() < self.config.capacity_count
            && self.current_weight + occupant.weight <= self.config.max_weight
    }

    pub fn add_passenger(&mut self, occupant: Occupant) -> Result<(), CarError> {
        let result = if self.has_occupant(occupant.id) {
            Err(CarError::DuplicateOccupant(occupant.id))
        } else if self.occupants.len() >= self.config.capacity_count {
            Err(CarError::CapacityExceeded {
                capacity: self.config.capacity_count,
            })
        } else if self.current_weight + occupant.weight > self.config.max_weight {
            Err(CarError::WeightExceeded {
                attempted: self.current_weight + occupant.weight,
                max_weight: self.config.max_weight,
            })
        } else {
            Ok(())
        };

        if let Err(e) = &result {
            warn!("{}: rejected boarding: {}", self.id, e);
            return result;
        }

        debug!(
            "{}: {} boarded at floor {} for floor {}",
            self.id, occupant.id, self.current_floor, occupant.destination_floor
        );
        self.occupants.push(occupant);
        self.recompute_weight();
        self.publish_state();
        Ok(())
    }

    pub fn remove_passenger(&mut self, occupant_id: OccupantId) -> Result<Occupant, CarError> {
        let index = match self.occupants.iter().position(|o| o.id == occupant_id) {
            Some(index) => index,
            None => {
                warn!("{}: cannot remove {}, not aboard", self.id, occupant_id);
                return Err(CarError::UnknownOccupant(occupant_id));
            }
        };

        let occupant = self.occupants.remove(index);
        self.recompute_weight();
        debug!("{}: {} left at floor {}", self.id, occupant.id, self.current_floor);
        self.publish_state();
        Ok(occupant)
    }

    pub fn enter_maintenance(&mut self) -> Result<(), CarError> {
        self.suspend(CarStatus::Maintenance)
    }

    pub fn take_out_of_service(&mut self) -> Result<(), CarError> {
        self.suspend(CarStatus::OutOfService)
    }

    pub fn return_to_service(&mut self) {
        if self.status.is_in_service() {
            return;
        }
        info!("{}: returned to service at floor {}", self.id, self.current_floor);
        self.status = CarStatus::Idle;
        self.phase = Phase::Idle;
        self.process_queue();
        self.publish_state();
    }

    /// Advances the state machine by `dt` seconds of simulated time.
    pub fn advance(&mut self, dt: f64) {
        self.clock += dt;
        self.ticks += 1;

        if !self.status.is_in_service() {
            return;
        }

        self.run_watchdog();

        match self.phase {
            Phase::Idle | Phase::Suspended => {}
            Phase::Moving { target } => self.step_motion(target, dt),
            Phase::DoorsOpening { until } => {
                if self.clock >= until {
                    self.finish_door_open();
                }
            }
            Phase::DoorsOpen { until } => {
                if self.clock >= until {
                    self.begin_door_close();
                }
            }
            Phase::DoorsClosing { until } => {
                if self.clock >= until {
                    self.finish_door_close();
                }
            }
        }
    }

    /***************************************/
    /*        Snapshot accessors           */
    /***************************************/
    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn current_floor(&self) -> i32 {
        self.current_floor
    }

    pub fn is_moving(&self) -> bool {
        self.status.is_moving()
    }

    pub fn doors_open(&self) -> bool {
        self.doors_open
    }

    pub fn status(&self) -> CarStatus {
        self.status
    }

    pub fn requested_floors_count(&self) -> usize {
        self.queue.len() + self.behind.len()
    }

    /// Pending stops in service order, followed by any held for the next arrival.
    pub fn requested_floors(&self) -> Vec<i32> {
        let mut floors = self.queue.floors();
        floors.extend(self.behind.floors());
        floors
    }

    pub fn cabin_position(&self) -> f64 {
        self.position
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    pub fn has_occupant(&self, occupant_id: OccupantId) -> bool {
        self.occupants.iter().any(|o| o.id == occupant_id)
    }

    pub fn current_weight(&self) -> f64 {
        self.current_weight
    }

    pub fn max_weight(&self) -> f64 {
        self.config.max_weight
    }

    pub fn capacity_count(&self) -> usize {
        self.config.capacity_count
    }

    pub fn top_floor(&self) -> i32 {
        self.top_floor
    }

    pub fn snapshot(&self) -> CarSnapshot {
        CarSnapshot {
            id: self.id,
            current_floor: self.current_floor,
            status: self.status,
            doors_open: self.doors_open,
            is_moving: self.is_moving(),
            requested_floors: self.requested_floors(),
            cabin_position: self.position,
            occupants: self.occupants.len(),
            current_weight: self.current_weight,
        }
    }

    /***************************************/
    /*          Private helpers            */
    /***************************************/
    fn floor_coordinate(&self, floor: i32) -> f64 {
        floor as f64 * self.floor_height
    }

    fn recompute_weight(&mut self) {
        self.current_weight = self.occupants.iter().map(|o| o.weight).sum();
    }

    fn boarded_destinations(&self) -> Vec<i32> {
        let mut destinations: Vec<i32> = Vec::new();
        for occupant in &self.occupants {
            if !destinations.contains(&occupant.destination_floor) {
                destinations.push(occupant.destination_floor);
            }
        }
        destinations
    }

    fn process_queue(&mut self) {
        if !self.status.is_in_service() {
            return;
        }

        let boarded = self.boarded_destinations();
        self.queue.reorder(self.current_floor, self.status, &boarded);
        debug!("{}: service order {:?}", self.id, self.queue.floors());

        let target = match self.queue.head() {
            Some(target) => target,
            None => {
                self.status = CarStatus::Idle;
                self.phase = Phase::Idle;
                self.publish_state();
                return;
            }
        };

        if self.doors_open {
            self.begin_door_close();
            return;
        }

        if target == self.current_floor {
            self.queue.remove(target);
            self.serve_current_floor();
            return;
        }

        self.status = match Direction::between(self.current_floor, target) {
            Direction::Down => CarStatus::MovingDown,
            _ => CarStatus::MovingUp,
        };
        self.signaled.clear();
        self.phase = Phase::Moving { target };
        debug!(
            "{}: departing floor {} for floor {}",
            self.id, self.current_floor, target
        );
        self.publish_state();
    }

    fn step_motion(&mut self, target: i32, dt: f64) {
        let target_position = self.floor_coordinate(target);
        let remaining = target_position - self.position;
        let step = self.config.speed * dt;

        if remaining.abs() <= step {
            self.position = target_position;
        } else {
            self.position += step.copysign(remaining);
        }
        trace!("{}: cabin at {:.2} m", self.id, self.position);

        if (target_position - self.position).abs() <= self.config.arrival_epsilon {
            self.position = target_position;
            self.current_floor = target;
            self.queue.remove(target);
            self.queue.absorb(&mut self.behind);
            info!("{}: arrived at floor {}", self.id, target);
            self.serve_current_floor();
        }
    }

    fn serve_current_floor(&mut self) {
        let _ = self.event_tx.send(CarEvent::StopServed {
            car: self.id,
            floor: self.current_floor,
        });
        self.status = CarStatus::Loading;
        self.phase = Phase::DoorsOpening {
            until: self.clock + self.config.door_transition_time,
        };
        debug!("{}: doors opening at floor {}", self.id, self.current_floor);
        self.publish_state();
    }

    fn finish_door_open(&mut self) {
        self.doors_open = true;
        let _ = self.event_tx.send(CarEvent::DoorsOpened {
            car: self.id,
            floor: self.current_floor,
        });

        let floor = self.current_floor;
        let leaving: Vec<OccupantId> = self
            .occupants
            .iter()
            .filter(|o| o.destination_floor == floor && !self.signaled.contains(&o.id))
            .map(|o| o.id)
            .collect();
        for occupant in leaving {
            self.signaled.push(occupant);
            let _ = self.event_tx.send(CarEvent::ExitSignal {
                car: self.id,
                occupant,
                floor,
            });
        }

        self.phase = Phase::DoorsOpen {
            until: self.clock + self.config.dwell_time,
        };
        self.publish_state();
    }

    fn begin_door_close(&mut self) {
        self.phase = Phase::DoorsClosing {
            until: self.clock + self.config.door_transition_time,
        };
        debug!("{}: doors closing at floor {}", self.id, self.current_floor);
    }

    fn finish_door_close(&mut self) {
        self.doors_open = false;
        let _ = self.event_tx.send(CarEvent::DoorsClosed {
            car: self.id,
            floor: self.current_floor,
        });
        self.phase = Phase::Idle;
        self.process_queue();
    }

    fn run_watchdog(&mut self) {
        let interval = self.config.watchdog_interval_ticks;
        if interval == 0 || self.ticks % interval != 0 {
            return;
        }
        if self.phase == Phase::Idle && !self.queue.is_empty() {
            warn!(
                "{}: idle with {} queued stops, reprocessing",
                self.id,
                self.queue.len()
            );
            self.process_queue();
        }
    }

    fn suspend(&mut self, status: CarStatus) -> Result<(), CarError> {
        if self.status.is_moving() {
            warn!("{}: cannot enter {:?} while moving", self.id, status);
            return Err(CarError::InTransit(self.id));
        }
        info!("{}: entering {:?} at floor {}", self.id, status, self.current_floor);
        self.status = status;
        self.doors_open = false;
        self.phase = Phase::Suspended;
        self.publish_state();
        Ok(())
    }

    fn publish_state(&self) {
        let _ = self.event_tx.send(CarEvent::StateChanged(self.snapshot()));
    }

    /***************************************/
    /*           Test helpers              */
    /***************************************/
    #[cfg(test)]
    pub(crate) fn test_enqueue_silently(&mut self, floor: i32) {
        self.queue.push(floor, RequestOrigin::External);
    }
}
