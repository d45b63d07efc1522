/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, trace, warn};
use serde::Serialize;
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{BuildingConfig, Config, ConfigError, SimulationConfig, TripConfig};
use crate::coordinator::DispatchController;
use crate::elevator::Car;
use crate::shared::{
    CarEvent, CarId, CarSnapshot, CarStatus, Occupant, OccupantId, RequestOrigin,
};
use crate::simulation::clock::SimClock;

/***************************************/
/*               Errors                */
/***************************************/
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("trip {origin} -> {destination} is outside [0, {top_floor}]")]
    TripOutOfRange {
        origin: i32,
        destination: i32,
        top_floor: i32,
    },

    #[error("trip starts and ends at floor {0}")]
    EmptyTrip(i32),
}

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Debug, Clone, PartialEq)]
pub enum PassengerState {
    /// Waiting at the origin floor, possibly assigned to a car.
    Waiting {
        car: Option<CarId>,
        since: f64,
        retry_at: Option<f64>,
        refused_by: Option<CarId>,
    },
    Riding {
        car: CarId,
    },
    /// Took the stairs, arrives at `until`.
    Walking {
        until: f64,
    },
    Arrived {
        at: f64,
    },
}

#[derive(Debug, Clone)]
pub struct Passenger {
    pub occupant: Occupant,
    pub origin: i32,
    pub state: PassengerState,
    pub spawned_at: f64,
    /// Cars this passenger gave up on.
    pub abandoned: Vec<CarId>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub trips_completed: u64,
    pub stairs_taken: u64,
    pub abandoned_calls: u64,
    pub boarding_refusals: u64,
    pub boarded: u64,
    pub total_wait_seconds: f64,
}

impl SimulationStats {
    pub fn mean_wait_seconds(&self) -> f64 {
        if self.boarded == 0 {
            0.0
        } else {
            self.total_wait_seconds / self.boarded as f64
        }
    }
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Top-level simulation context.
 *
 * Owns the cars, the dispatch controller and the passengers, and drives all of them from
 * one thread. Each `step` advances the clock, advances every car, drains the car event
 * channel and then lets waiting passengers react.
 *
 * # Fields
 * - `event_rx`:    Shared receiver for every car's events.
 * - `next_id`:     Next occupant id to hand out.
 */
pub struct Simulation {
    config: SimulationConfig,
    building: BuildingConfig,
    clock: SimClock,
    cars: Vec<Car>,
    dispatcher: DispatchController,
    passengers: Vec<Passenger>,
    event_rx: cbc::Receiver<CarEvent>,
    next_id: u64,
    stats: SimulationStats,
}

impl Simulation {
    /// Builds the simulation from `config`, rejecting configurations that fail validation.
    pub fn new(config: &Config) -> Result<Simulation, ConfigError> {
        config.validate()?;
        let clock = SimClock::new(config.simulation.tick_seconds)?;
        let (event_tx, event_rx) = cbc::unbounded::<CarEvent>();

        let cars: Vec<Car> = (0..config.car.count)
            .map(|i| Car::new(CarId(i), &config.car, &config.building, event_tx.clone()))
            .collect();
        let roster = cars.iter().map(|car| car.id()).collect();
        let dispatcher = DispatchController::new(roster, &config.dispatch);

        info!(
            "Simulation ready: {} cars, floors 0..={}",
            cars.len(),
            config.building.top_floor
        );

        Ok(Simulation {
            config: config.simulation.clone(),
            building: config.building.clone(),
            clock,
            cars,
            dispatcher,
            passengers: Vec::new(),
            event_rx,
            next_id: 0,
            stats: SimulationStats::default(),
        })
    }

    /// Adds an occupant at `origin` who wants to reach `destination` and places a hall call.
    pub fn spawn_occupant(
        &mut self,
        origin: i32,
        destination: i32,
        weight: f64,
    ) -> Result<OccupantId, SimulationError> {
        let top_floor = self.building.top_floor;
        let in_range = |floor: i32| (0..=top_floor).contains(&floor);
        if !in_range(origin) || !in_range(destination) {
            warn!("Rejected trip {} -> {}", origin, destination);
            return Err(SimulationError::TripOutOfRange {
                origin,
                destination,
                top_floor,
            });
        }
        if origin == destination {
            warn!("Rejected trip {} -> {}", origin, destination);
            return Err(SimulationError::EmptyTrip(origin));
        }

        let id = OccupantId(self.next_id);
        self.next_id += 1;
        let now = self.clock.now();

        let mut passenger = Passenger {
            occupant: Occupant::new(id, destination, weight),
            origin,
            state: PassengerState::Waiting {
                car: None,
                since: now,
                retry_at: None,
                refused_by: None,
            },
            spawned_at: now,
            abandoned: Vec::new(),
        };
        debug!("{} spawned at floor {} for floor {}", id, origin, destination);

        self.call_car(&mut passenger, now);
        self.passengers.push(passenger);
        Ok(id)
    }

    pub fn step(&mut self) {
        let dt = self.clock.advance();
        for car in self.cars.iter_mut() {
            car.advance(dt);
        }

        let events: Vec<CarEvent> = self.event_rx.try_iter().collect();
        for event in events {
            self.handle_event(event);
        }

        self.update_passengers();
    }

    pub fn run_until(&mut self, seconds: f64) {
        while self.clock.now() < seconds {
            self.step();
        }
    }

    /// Runs a scripted scenario, spawning each trip once the clock reaches its start time.
    pub fn run_scenario(&mut self, trips: &[TripConfig], duration_seconds: f64) {
        let mut pending: Vec<&TripConfig> = trips.iter().collect();
        pending.sort_by(|a, b| a.at.total_cmp(&b.at));
        let mut pending = pending.into_iter().peekable();

        loop {
            while let Some(trip) = pending.next_if(|trip| trip.at <= self.clock.now()) {
                if let Err(e) = self.spawn_occupant(trip.origin, trip.destination, trip.weight) {
                    warn!("Skipping scripted trip: {}", e);
                }
            }
            if self.clock.now() >= duration_seconds {
                break;
            }
            self.step();
        }
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car_mut(&mut self, id: CarId) -> Option<&mut Car> {
        self.cars.iter_mut().find(|car| car.id() == id)
    }

    pub fn dispatcher(&self) -> &DispatchController {
        &self.dispatcher
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn passenger(&self, id: OccupantId) -> Option<&Passenger> {
        self.passengers.iter().find(|p| p.occupant.id == id)
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn snapshots(&self) -> Vec<CarSnapshot> {
        self.cars.iter().map(|car| car.snapshot()).collect()
    }

    /***************************************/
    /*          Private helpers            */
    /***************************************/
    fn handle_event(&mut self, event: CarEvent) {
        match event {
            CarEvent::ExitSignal {
                car,
                occupant,
                floor,
            } => {
                let removed = self
                    .car_mut(car)
                    .map(|c| c.remove_passenger(occupant).is_ok())
                    .unwrap_or(false);
                if !removed {
                    return;
                }

                let now = self.clock.now();
                let passenger = self.passengers.iter_mut().find(|p| p.occupant.id == occupant);
                if let Some(passenger) = passenger {
                    passenger.state = PassengerState::Arrived { at: now };
                    self.stats.trips_completed += 1;
                    debug!("{} arrived at floor {} by {}", occupant, floor, car);
                }
            }
            CarEvent::DoorsOpened { car, floor } => {
                trace!("{} doors open at floor {}", car, floor);
            }
            CarEvent::DoorsClosed { car, floor } => {
                trace!("{} doors closed at floor {}", car, floor);
            }
            CarEvent::StopServed { car, floor } => {
                trace!("{} served floor {}", car, floor);
            }
            CarEvent::StateChanged(_) => {}
        }
    }

    fn update_passengers(&mut self) {
        let now = self.clock.now();
        let mut passengers = std::mem::take(&mut self.passengers);

        for passenger in passengers.iter_mut() {
            match passenger.state.clone() {
                PassengerState::Waiting {
                    car: Some(car_id),
                    since,
                    ..
                } => {
                    if self.try_board(passenger, car_id, since) {
                        continue;
                    }
                    if now - since > self.config.patience_seconds {
                        self.abandon_call(passenger, car_id);
                    }
                }
                PassengerState::Waiting {
                    car: None,
                    since,
                    retry_at: Some(retry_at),
                    refused_by,
                } if now >= retry_at => {
                    // Calling the full car back while it is still here would only reopen its doors
                    let still_here = refused_by
                        .map_or(false, |id| self.is_loading_at(id, passenger.origin));
                    if still_here {
                        passenger.state = PassengerState::Waiting {
                            car: None,
                            since,
                            retry_at: Some(now + self.config.boarding_retry_seconds),
                            refused_by,
                        };
                    } else {
                        self.call_car(passenger, since);
                    }
                }
                PassengerState::Walking { until } if now >= until => {
                    passenger.state = PassengerState::Arrived { at: now };
                    debug!(
                        "{} reached floor {} on foot",
                        passenger.occupant.id, passenger.occupant.destination_floor
                    );
                }
                _ => {}
            }
        }

        self.passengers = passengers;
    }

    // Boards if the assigned car is stopped here with its doors open
    fn try_board(&mut self, passenger: &mut Passenger, car_id: CarId, since: f64) -> bool {
        let now = self.clock.now();
        let retry_seconds = self.config.boarding_retry_seconds;
        let car = match self.cars.iter_mut().find(|car| car.id() == car_id) {
            Some(car) => car,
            None => return false,
        };

        if !car.doors_open() || car.current_floor() != passenger.origin {
            return false;
        }

        if !car.can_enter(&passenger.occupant) {
            self.stats.boarding_refusals += 1;

            if passenger.occupant.weight > car.max_weight() {
                info!(
                    "{} is too heavy for {}, looking elsewhere",
                    passenger.occupant.id, car_id
                );
                passenger.abandoned.push(car_id);
                self.call_car(passenger, now);
                return true;
            }

            debug!("{} could not board {}, retrying", passenger.occupant.id, car_id);
            passenger.state = PassengerState::Waiting {
                car: None,
                since,
                retry_at: Some(now + retry_seconds),
                refused_by: Some(car_id),
            };
            return true;
        }

        if car.add_passenger(passenger.occupant.clone()).is_err() {
            return false;
        }
        let _ = car.request_floor(passenger.occupant.destination_floor, RequestOrigin::Internal);

        self.stats.boarded += 1;
        self.stats.total_wait_seconds += now - passenger.spawned_at;
        passenger.state = PassengerState::Riding { car: car_id };
        true
    }

    fn is_loading_at(&self, car_id: CarId, floor: i32) -> bool {
        self.cars.iter().any(|car| {
            car.id() == car_id && car.status() == CarStatus::Loading && car.current_floor() == floor
        })
    }

    fn abandon_call(&mut self, passenger: &mut Passenger, car_id: CarId) {
        info!(
            "{} gave up waiting for {} at floor {}",
            passenger.occupant.id, car_id, passenger.origin
        );
        self.stats.abandoned_calls += 1;
        if let Some(car) = self.car_mut(car_id) {
            car.cancel_hall_call(passenger.origin);
        }
        passenger.abandoned.push(car_id);
        let now = self.clock.now();
        self.call_car(passenger, now);
    }

    // Assigns a car not already abandoned, or sends the passenger up the stairs. Patience
    // on the assigned car counts from `since`.
    fn call_car(&mut self, passenger: &mut Passenger, since: f64) {
        let now = self.clock.now();
        let origin = passenger.origin;
        let destination = passenger.occupant.destination_floor;

        let chosen = self.dispatcher.dispatch_hall_call(
            &mut self.cars,
            origin,
            destination,
            &passenger.abandoned,
        );

        match chosen {
            Some(id) => {
                passenger.state = PassengerState::Waiting {
                    car: Some(id),
                    since,
                    retry_at: None,
                    refused_by: None,
                };
            }
            None => {
                let floors = (destination - origin).abs() as f64;
                let until = now + floors * self.config.stairs_seconds_per_floor;
                info!(
                    "{} taking the stairs from {} to {}",
                    passenger.occupant.id, origin, destination
                );
                self.stats.stairs_taken += 1;
                passenger.state = PassengerState::Walking { until };
            }
        }
    }
}
