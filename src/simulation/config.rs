//! Tunable parameters for a simulation run

use super::error::{Result, SimError};
use super::types::{
    DEFAULT_MAX_CATCH_UP, DEFAULT_MAX_SPAWN_ATTEMPTS, DEFAULT_MIN_SEPARATION,
    DEFAULT_PHYSICS_RATE, DEFAULT_VEHICLE_LENGTH, MAX_PHYSICS_RATE,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Physics steps per second of real time
    pub physics_rate: f64,
    /// Cap on physics steps per frame; `None` catches up without limit
    pub max_catch_up: Option<u32>,
    /// Length of vehicles placed by the builder
    pub vehicle_length: f32,
    /// Minimum gap the spawn search keeps between vehicles on one road
    pub min_separation: f32,
    pub max_spawn_attempts: u32,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            physics_rate: DEFAULT_PHYSICS_RATE,
            max_catch_up: Some(DEFAULT_MAX_CATCH_UP),
            vehicle_length: DEFAULT_VEHICLE_LENGTH,
            min_separation: DEFAULT_MIN_SEPARATION,
            max_spawn_attempts: DEFAULT_MAX_SPAWN_ATTEMPTS,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.physics_rate.is_finite() && self.physics_rate > 0.0) {
            return Err(SimError::InvalidConfig("physics rate must be positive"));
        }
        if self.physics_rate > MAX_PHYSICS_RATE {
            return Err(SimError::InvalidConfig("physics rate must be at most 1000 steps/s"));
        }
        if self.max_catch_up == Some(0) {
            return Err(SimError::InvalidConfig("catch-up cap must allow at least one step"));
        }
        if !(self.vehicle_length.is_finite() && self.vehicle_length >= 0.0) {
            return Err(SimError::InvalidConfig("vehicle length must be non-negative"));
        }
        if !(self.min_separation.is_finite() && self.min_separation >= 0.0) {
            return Err(SimError::InvalidConfig("minimum separation must be non-negative"));
        }
        if self.max_spawn_attempts == 0 {
            return Err(SimError::InvalidConfig("spawn search needs at least one attempt"));
        }
        Ok(())
    }
}
