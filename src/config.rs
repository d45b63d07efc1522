/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/***************************************/
/*               Errors                */
/***************************************/
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub building: BuildingConfig,
    #[serde(default)]
    pub car: CarConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub trips: Vec<TripConfig>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_seconds: f64,
    pub duration_seconds: f64,
    pub patience_seconds: f64,
    pub boarding_retry_seconds: f64,
    pub stairs_seconds_per_floor: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tick_seconds: 0.1,
            duration_seconds: 300.0,
            patience_seconds: 60.0,
            boarding_retry_seconds: 2.0,
            stairs_seconds_per_floor: 10.0,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct BuildingConfig {
    pub top_floor: i32,
    pub floor_height: f64,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        BuildingConfig {
            top_floor: 9,
            floor_height: 3.5,
        }
    }
}

/**
 * Per-car physical limits and timings.
 *
 * # Fields
 * - `door_transition_time`:    Seconds the doors take to open, and again to close.
 * - `dwell_time`:              Seconds the doors stay fully open at a stop.
 * - `arrival_epsilon`:         Distance in metres at which the cabin snaps to the floor.
 * - `watchdog_interval_ticks`: How often an idle car re-checks its queue.
 */
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CarConfig {
    pub count: usize,
    pub speed: f64,
    pub door_transition_time: f64,
    pub dwell_time: f64,
    pub capacity_count: usize,
    pub max_weight: f64,
    pub arrival_epsilon: f64,
    pub watchdog_interval_ticks: u64,
}

impl Default for CarConfig {
    fn default() -> Self {
        CarConfig {
            count: 3,
            speed: 2.0,
            door_transition_time: 1.0,
            dwell_time: 2.0,
            capacity_count: 8,
            max_weight: 630.0,
            arrival_epsilon: 0.01,
            watchdog_interval_ticks: 50,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    pub moving_toward_bonus: f64,
    pub wrong_direction_penalty: f64,
    pub idle_bonus: f64,
    pub queue_length_weight: f64,
    pub heavy_load_penalty: f64,
    pub heavy_load_ratio: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            moving_toward_bonus: 2.0,
            wrong_direction_penalty: 3.0,
            idle_bonus: 1.0,
            queue_length_weight: 1.5,
            heavy_load_penalty: 5.0,
            heavy_load_ratio: 0.9,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct TripConfig {
    pub at: f64,
    pub origin: i32,
    pub destination: i32,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    75.0
}

/***************************************/
/*             Public API              */
/***************************************/
impl Config {
    pub fn from_toml(config_str: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.building.top_floor < 1 {
            return Err(ConfigError::Invalid(format!(
                "top_floor must be at least 1, got {}",
                self.building.top_floor
            )));
        }
        if self.building.floor_height <= 0.0 {
            return Err(ConfigError::Invalid("floor_height must be positive".into()));
        }
        if self.car.speed <= 0.0 {
            return Err(ConfigError::Invalid("car speed must be positive".into()));
        }
        if self.car.capacity_count == 0 {
            return Err(ConfigError::Invalid("capacity_count must be positive".into()));
        }
        if self.car.max_weight <= 0.0 {
            return Err(ConfigError::Invalid("max_weight must be positive".into()));
        }
        if self.simulation.tick_seconds <= 0.0 {
            return Err(ConfigError::Invalid("tick_seconds must be positive".into()));
        }

        for trip in &self.trips {
            let in_range = |floor: i32| (0..=self.building.top_floor).contains(&floor);
            if !in_range(trip.origin) || !in_range(trip.destination) {
                return Err(ConfigError::Invalid(format!(
                    "trip at {}s uses a floor outside [0, {}]",
                    trip.at, self.building.top_floor
                )));
            }
        }

        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path)?;
    Config::from_toml(&config_str)
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        // Arrange
        let input = r#"
            [building]
            top_floor = 4

            [[trips]]
            at = 1.5
            origin = 0
            destination = 3
        "#;

        // Act
        let config = Config::from_toml(input).unwrap();

        // Assert
        assert_eq!(config.building.top_floor, 4);
        assert_eq!(config.building.floor_height, 3.5);
        assert_eq!(config.car.capacity_count, 8);
        assert_eq!(config.dispatch, DispatchConfig::default());
        assert_eq!(config.trips.len(), 1);
        assert_eq!(config.trips[0].weight, 75.0);
    }

    #[test]
    fn test_trip_outside_building_is_rejected() {
        let input = r#"
            [building]
            top_floor = 4

            [[trips]]
            at = 0.0
            origin = 0
            destination = 9
        "#;

        let result = Config::from_toml(input);

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_positive_speed_is_rejected() {
        let input = r#"
            [car]
            speed = 0.0
        "#;

        assert!(matches!(Config::from_toml(input), Err(ConfigError::Invalid(_))));
    }
}
