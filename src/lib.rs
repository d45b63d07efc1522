//! Dispatch and motion scheduling for a bank of elevator cars.
//!
//! `elevator` holds the per-car state machine and its SCAN request queue, `coordinator`
//! scores cars against hall calls, and `simulation` ties both to a tick-driven clock and
//! a roster of occupants.

/* Modules */
pub mod config;
pub mod coordinator;
pub mod elevator;
pub mod shared;
pub mod simulation;

pub use config::Config;
pub use coordinator::DispatchController;
pub use elevator::{Car, CarError, RequestQueue};
pub use shared::{CarEvent, CarId, CarSnapshot, CarStatus, Direction, Occupant, OccupantId};
pub use simulation::{SimClock, Simulation, SimulationStats};
