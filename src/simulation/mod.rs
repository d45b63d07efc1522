pub mod clock;
pub mod simulation;
pub mod simulation_tests;

pub use clock::SimClock;
pub use simulation::Passenger;
pub use simulation::PassengerState;
pub use simulation::Simulation;
pub use simulation::SimulationError;
pub use simulation::SimulationStats;
