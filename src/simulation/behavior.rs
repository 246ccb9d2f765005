//! Pluggable vehicle behaviors
//!
//! A behavior runs once per vehicle per physics step. It sees the vehicle's
//! public state, its own private memory, and a [`DriveHelper`] that is the
//! only way to move the vehicle around the network. New driving styles are
//! added by implementing [`Behavior`]; the engine never changes.

use std::collections::HashMap;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use super::error::{Result, SimError};
use super::road_network::{Road, RoadNetwork};
use super::types::RoadId;
use super::vehicle::{Placement, VehicleState};

/// Per-vehicle memory owned by the behavior; the engine only creates it empty
pub type BehaviorState = HashMap<String, f32>;

pub trait Behavior {
    fn drive(
        &self,
        vehicle: &mut VehicleState,
        memory: &mut BehaviorState,
        helper: &mut DriveHelper<'_>,
    ) -> Result<()>;
}

impl<F> Behavior for F
where
    F: Fn(&mut VehicleState, &mut BehaviorState, &mut DriveHelper<'_>) -> Result<()>,
{
    fn drive(
        &self,
        vehicle: &mut VehicleState,
        memory: &mut BehaviorState,
        helper: &mut DriveHelper<'_>,
    ) -> Result<()> {
        self(vehicle, memory, helper)
    }
}

/// Wraps a closure as a shareable behavior
pub fn from_fn<F>(f: F) -> Rc<dyn Behavior>
where
    F: Fn(&mut VehicleState, &mut BehaviorState, &mut DriveHelper<'_>) -> Result<()> + 'static,
{
    Rc::new(f)
}

/// The capabilities a behavior has over its own vehicle
pub struct DriveHelper<'a> {
    placement: &'a mut Placement,
    road: &'a Road,
    network: &'a RoadNetwork,
    rng: &'a mut StdRng,
}

impl<'a> DriveHelper<'a> {
    pub(crate) fn new(
        placement: &'a mut Placement,
        network: &'a RoadNetwork,
        rng: &'a mut StdRng,
    ) -> Result<Self> {
        let road = network.road(placement.road_id)?;
        Ok(Self {
            placement,
            road,
            network,
            rng,
        })
    }

    pub fn current_road(&self) -> &Road {
        self.road
    }

    /// Distance left before the end of the current road (negative once past it)
    pub fn remaining_distance_on_road(&self) -> f32 {
        self.road.distance - self.placement.position
    }

    /// Moves the vehicle along its road with no bounds or speed-limit check
    pub fn advance(&mut self, delta: f32) {
        self.placement.position += delta;
    }

    /// Moves the vehicle to the start of a random successor road.
    ///
    /// On a dead end the vehicle stays where it is and `DeadEnd` is returned.
    pub fn take_random_next_road(&mut self) -> Result<RoadId> {
        let next = *self
            .road
            .connects_to
            .choose(&mut *self.rng)
            .ok_or(SimError::DeadEnd { road: self.road.id })?;

        self.road = self.network.road(next)?;
        self.placement.road_id = next;
        self.placement.position = 0.0;
        Ok(next)
    }
}

/// Steps forward a fixed amount until close to the end of the road, then
/// turns onto a random successor
#[derive(Debug, Clone, Copy)]
pub struct Basic {
    pub stride: f32,
}

impl Default for Basic {
    fn default() -> Self {
        Self { stride: 3.0 }
    }
}

impl Behavior for Basic {
    fn drive(
        &self,
        _vehicle: &mut VehicleState,
        _memory: &mut BehaviorState,
        helper: &mut DriveHelper<'_>,
    ) -> Result<()> {
        if helper.remaining_distance_on_road() > self.stride {
            helper.advance(self.stride);
        } else {
            helper.take_random_next_road()?;
        }
        Ok(())
    }
}

/// Drives at a multiple of each road's speed limit without overshooting its end
#[derive(Debug, Clone, Copy)]
pub struct Cruise {
    pub limit_factor: f32,
}

impl Default for Cruise {
    fn default() -> Self {
        Self { limit_factor: 3.0 }
    }
}

impl Behavior for Cruise {
    fn drive(
        &self,
        vehicle: &mut VehicleState,
        memory: &mut BehaviorState,
        helper: &mut DriveHelper<'_>,
    ) -> Result<()> {
        let remaining = helper.remaining_distance_on_road();
        if remaining <= 0.0 {
            helper.take_random_next_road()?;
            return Ok(());
        }

        vehicle.speed = helper.current_road().speed_limit * self.limit_factor;
        let delta = vehicle.speed.min(remaining);
        helper.advance(delta);
        *memory.entry("odometer".to_string()).or_insert(0.0) += delta;
        Ok(())
    }
}

pub const BEHAVIOR_NAMES: [&str; 2] = ["basic", "cruise"];

/// Looks up a built-in behavior by its CLI name
pub fn by_name(name: &str) -> Option<Rc<dyn Behavior>> {
    match name.to_ascii_lowercase().as_str() {
        "basic" => Some(Rc::new(Basic::default())),
        "cruise" => Some(Rc::new(Cruise::default())),
        _ => None,
    }
}
