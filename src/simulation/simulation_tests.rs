/*
 * Unit tests for the simulation context
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 * - test_single_trip_completes
 * - test_full_car_refuses_then_returns
 * - test_patience_redirects_then_falls_back_to_stairs
 * - test_no_car_in_service_takes_stairs
 * - test_invalid_trips_are_rejected
 * - test_scenario_spawns_trips_on_time
 * - test_too_heavy_passenger_takes_stairs
 * - test_refusal_keeps_patience_clock
 * - test_invalid_config_is_rejected
 *
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod simulation_tests {
    use crate::config::{
        BuildingConfig, CarConfig, Config, ConfigError, DispatchConfig, SimulationConfig,
        TripConfig,
    };
    use crate::shared::{CarId, CarStatus};
    use crate::simulation::{PassengerState, Simulation, SimulationError};

    fn setup_config(cars: usize, capacity: usize, patience: f64) -> Config {
        // 0.25 s ticks, 1 m floors and a 1 m/s car keep every timestamp exact
        Config {
            simulation: SimulationConfig {
                tick_seconds: 0.25,
                duration_seconds: 60.0,
                patience_seconds: patience,
                boarding_retry_seconds: 2.0,
                stairs_seconds_per_floor: 10.0,
            },
            building: BuildingConfig {
                top_floor: 9,
                floor_height: 1.0,
            },
            car: CarConfig {
                count: cars,
                speed: 1.0,
                door_transition_time: 1.0,
                dwell_time: 2.0,
                capacity_count: capacity,
                max_weight: 400.0,
                arrival_epsilon: 0.01,
                watchdog_interval_ticks: 50,
            },
            dispatch: DispatchConfig::default(),
            trips: Vec::new(),
        }
    }

    #[test]
    fn test_single_trip_completes() {
        // Purpose: Doors open at the lobby after 1 s, the rider boards, the car leaves at
        // 4 s, reaches floor 3 at 7 s and the doors open there at 8 s

        // Arrange
        let mut sim = Simulation::new(&setup_config(1, 4, 60.0)).unwrap();

        // Act
        let id = sim.spawn_occupant(0, 3, 75.0).unwrap();
        sim.run_until(30.0);

        // Assert
        let passenger = sim.passenger(id).unwrap();
        assert_eq!(passenger.state, PassengerState::Arrived { at: 8.0 });
        assert_eq!(sim.stats().trips_completed, 1);
        assert_eq!(sim.stats().boarded, 1);
        assert_eq!(sim.stats().mean_wait_seconds(), 1.0);
        let car = &sim.cars()[0];
        assert!(car.occupants().is_empty());
        assert_eq!(car.current_weight(), 0.0);
        assert_eq!(car.current_floor(), 3);
        assert_eq!(car.status(), CarStatus::Idle);
    }

    #[test]
    fn test_full_car_refuses_then_returns() {
        // Purpose: With room for one, the second rider is refused, waits for the car to
        // leave, calls it again and is picked up on the way back

        // Arrange
        let mut sim = Simulation::new(&setup_config(1, 1, 60.0)).unwrap();

        // Act
        let first = sim.spawn_occupant(0, 3, 70.0).unwrap();
        let second = sim.spawn_occupant(0, 3, 70.0).unwrap();
        sim.run_until(60.0);

        // Assert
        assert_eq!(sim.stats().boarding_refusals, 1);
        assert_eq!(sim.stats().trips_completed, 2);
        assert!(matches!(
            sim.passenger(first).unwrap().state,
            PassengerState::Arrived { .. }
        ));
        assert!(matches!(
            sim.passenger(second).unwrap().state,
            PassengerState::Arrived { .. }
        ));
        assert!(sim.cars()[0].occupants().is_empty());
    }

    #[test]
    fn test_patience_redirects_then_falls_back_to_stairs() {
        // Arrange
        let mut sim = Simulation::new(&setup_config(2, 4, 2.0)).unwrap();
        let id = sim.spawn_occupant(5, 0, 80.0).unwrap();

        // Act: the first car takes 5 s to arrive, longer than the 2 s patience
        sim.run_until(2.5);

        // Assert
        let passenger = sim.passenger(id).unwrap();
        assert_eq!(passenger.abandoned, vec![CarId(0)]);
        assert!(matches!(
            passenger.state,
            PassengerState::Waiting {
                car: Some(CarId(1)),
                ..
            }
        ));
        assert!(!sim.cars()[0].requested_floors().contains(&5));
        assert_eq!(sim.cars()[1].requested_floors(), vec![5]);
        assert_eq!(sim.stats().abandoned_calls, 1);

        // Second car is too slow as well, nothing is left to call
        sim.run_until(5.0);
        let passenger = sim.passenger(id).unwrap();
        assert!(matches!(passenger.state, PassengerState::Walking { .. }));
        assert_eq!(sim.stats().abandoned_calls, 2);
        assert_eq!(sim.stats().stairs_taken, 1);

        sim.run_until(60.0);
        assert!(matches!(
            sim.passenger(id).unwrap().state,
            PassengerState::Arrived { .. }
        ));
    }

    #[test]
    fn test_no_car_in_service_takes_stairs() {
        // Arrange
        let mut sim = Simulation::new(&setup_config(1, 4, 60.0)).unwrap();
        sim.car_mut(CarId(0)).unwrap().take_out_of_service().unwrap();

        // Act
        let id = sim.spawn_occupant(0, 4, 75.0).unwrap();

        // Assert
        assert_eq!(
            sim.passenger(id).unwrap().state,
            PassengerState::Walking { until: 40.0 }
        );
        assert_eq!(sim.stats().stairs_taken, 1);
        sim.run_until(41.0);
        assert_eq!(
            sim.passenger(id).unwrap().state,
            PassengerState::Arrived { at: 40.0 }
        );
        assert_eq!(sim.stats().trips_completed, 0);
    }

    #[test]
    fn test_invalid_trips_are_rejected() {
        let mut sim = Simulation::new(&setup_config(1, 4, 60.0)).unwrap();

        assert_eq!(
            sim.spawn_occupant(-1, 3, 75.0),
            Err(SimulationError::TripOutOfRange {
                origin: -1,
                destination: 3,
                top_floor: 9
            })
        );
        assert_eq!(sim.spawn_occupant(2, 2, 75.0), Err(SimulationError::EmptyTrip(2)));
        assert!(sim.passengers().is_empty());
        assert_eq!(sim.cars()[0].requested_floors_count(), 0);
    }

    #[test]
    fn test_scenario_spawns_trips_on_time() {
        // Arrange
        let mut sim = Simulation::new(&setup_config(2, 4, 60.0)).unwrap();
        let trips = vec![
            TripConfig {
                at: 5.0,
                origin: 6,
                destination: 1,
                weight: 75.0,
            },
            TripConfig {
                at: 0.0,
                origin: 0,
                destination: 4,
                weight: 75.0,
            },
        ];

        // Act
        sim.run_scenario(&trips, 90.0);

        // Assert
        assert_eq!(sim.passengers().len(), 2);
        assert_eq!(sim.passengers()[0].origin, 0);
        assert_eq!(sim.passengers()[1].spawned_at, 5.0);
        assert_eq!(sim.stats().trips_completed, 2);
        assert_eq!(sim.now(), 90.0);
    }

    #[test]
    fn test_too_heavy_passenger_takes_stairs() {
        // Purpose: Someone heavier than the car's limit stops calling it after one refusal

        // Arrange
        let mut sim = Simulation::new(&setup_config(1, 4, 10.0)).unwrap();

        // Act
        let id = sim.spawn_occupant(0, 4, 500.0).unwrap();
        sim.run_until(2.0);

        // Assert
        let passenger = sim.passenger(id).unwrap();
        assert_eq!(passenger.abandoned, vec![CarId(0)]);
        assert_eq!(passenger.state, PassengerState::Walking { until: 41.0 });
        assert_eq!(sim.stats().boarding_refusals, 1);
        assert_eq!(sim.stats().stairs_taken, 1);

        sim.run_until(600.0);
        assert_eq!(
            sim.passenger(id).unwrap().state,
            PassengerState::Arrived { at: 41.0 }
        );
        assert_eq!(sim.stats().boarding_refusals, 1);
        assert!(sim.cars()[0].occupants().is_empty());
    }

    #[test]
    fn test_refusal_keeps_patience_clock() {
        // Purpose: Patience runs from the first call, so waiting out a full car ends in
        // giving up on it instead of recalling it forever

        // Arrange
        let mut sim = Simulation::new(&setup_config(1, 1, 5.0)).unwrap();
        let rider = sim.spawn_occupant(0, 9, 70.0).unwrap();
        let waiting = sim.spawn_occupant(0, 9, 70.0).unwrap();

        // Act: refused at 1 s, recalls the car at 5 s, patience is over right after
        sim.run_until(6.0);

        // Assert
        assert!(matches!(
            sim.passenger(rider).unwrap().state,
            PassengerState::Riding { car: CarId(0) }
        ));
        let passenger = sim.passenger(waiting).unwrap();
        assert_eq!(passenger.abandoned, vec![CarId(0)]);
        assert!(matches!(passenger.state, PassengerState::Walking { .. }));
        assert_eq!(sim.stats().boarding_refusals, 1);
        assert_eq!(sim.stats().abandoned_calls, 1);
        assert!(!sim.cars()[0].requested_floors().contains(&0));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = setup_config(1, 4, 60.0);
        config.simulation.tick_seconds = 0.0;

        assert!(matches!(
            Simulation::new(&config),
            Err(ConfigError::Invalid(_))
        ));
    }
}
