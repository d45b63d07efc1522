//! Monotonic simulation clock.
//!
//! Time only moves forward, in fixed ticks. Door timers and occupant patience are
//! measured against it.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    /// Seconds elapsed since the simulation started
    now: f64,
    /// Ticks elapsed since the simulation started
    tick: u64,
    /// Seconds per tick
    tick_seconds: f64,
}

impl SimClock {
    pub fn new(tick_seconds: f64) -> Result<Self, ConfigError> {
        if tick_seconds.is_nan() || tick_seconds <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tick_seconds must be positive, got {}",
                tick_seconds
            )));
        }
        Ok(Self {
            now: 0.0,
            tick: 0,
            tick_seconds,
        })
    }

    /// Advance by one tick, returning the elapsed seconds.
    pub fn advance(&mut self) -> f64 {
        self.tick += 1;
        self.now = self.tick as f64 * self.tick_seconds;
        self.tick_seconds
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}
