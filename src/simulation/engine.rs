//! Vehicle simulation engine
//!
//! Owns the vehicles and advances them one physics step at a time by running
//! each vehicle's behavior against a [`DriveHelper`].

use std::rc::Rc;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::behavior::{Behavior, DriveHelper};
use super::config::SimConfig;
use super::error::{Result, SimError};
use super::road_network::RoadNetwork;
use super::types::{RoadId, VehicleId};
use super::vehicle::{Placement, Vehicle, VehicleSnapshot};

/// A collision-free place to put a new vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub road_id: RoadId,
    pub position: f32,
}

/// What happened during one call to [`VehicleSimulation::step`]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepReport {
    pub tick: u64,
    pub behaviors_run: usize,
    /// Vehicles whose behavior returned an error this step
    pub failures: Vec<(VehicleId, SimError)>,
}

pub struct VehicleSimulation {
    network: RoadNetwork,
    vehicles: Vec<Vehicle>,
    rng: StdRng,
    max_spawn_attempts: u32,
    tick: u64,
}

impl VehicleSimulation {
    pub fn new(network: RoadNetwork, config: &SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        Self {
            network,
            vehicles: Vec::new(),
            rng,
            max_spawn_attempts: config.max_spawn_attempts,
            tick: 0,
        }
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn vehicle(&self, id: VehicleId) -> Result<&Vehicle> {
        self.vehicles.get(id.0).ok_or(SimError::VehicleNotFound(id))
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Number of steps run so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Places a vehicle at an explicit spot; no spacing check is made
    pub fn spawn(
        &mut self,
        length: f32,
        road_id: RoadId,
        position: f32,
        behavior: Rc<dyn Behavior>,
    ) -> Result<VehicleId> {
        self.network.road(road_id)?;

        let id = VehicleId(self.vehicles.len());
        let placement = Placement { road_id, position };
        self.vehicles
            .push(Vehicle::new(id, length, placement, behavior));

        debug!("Spawned {} on {} at {:.2}", id, road_id, position);
        Ok(id)
    }

    /// Finds a random spot further than `min_separation` from every vehicle
    /// already on the chosen road
    pub fn find_free_spawn_point(&mut self, min_separation: f32) -> Result<SpawnPoint> {
        for _ in 0..self.max_spawn_attempts {
            let road = self.network.pick_random_road(&mut self.rng)?;
            let road_id = road.id;
            let position = self.rng.random_range(0.0..road.distance);

            let blocked = self.vehicles.iter().any(|vehicle| {
                vehicle.placement.road_id == road_id
                    && (vehicle.placement.position - position).abs() <= min_separation
            });
            if !blocked {
                return Ok(SpawnPoint { road_id, position });
            }
        }

        warn!(
            "Gave up looking for a spawn point after {} attempts ({} vehicles placed)",
            self.max_spawn_attempts,
            self.vehicles.len()
        );
        Err(SimError::NoSpawnSpace {
            attempts: self.max_spawn_attempts,
            min_separation,
        })
    }

    /// Searches for a free spot and spawns a vehicle there
    pub fn spawn_random(
        &mut self,
        length: f32,
        min_separation: f32,
        behavior: Rc<dyn Behavior>,
    ) -> Result<VehicleId> {
        let point = self.find_free_spawn_point(min_separation)?;
        self.spawn(length, point.road_id, point.position, behavior)
    }

    /// Runs every vehicle's behavior once, in spawn order
    pub fn step(&mut self) -> StepReport {
        self.tick += 1;
        let mut report = StepReport {
            tick: self.tick,
            ..StepReport::default()
        };

        for vehicle in &mut self.vehicles {
            let outcome =
                match DriveHelper::new(&mut vehicle.placement, &self.network, &mut self.rng) {
                    Ok(mut helper) => vehicle.behavior.drive(
                        &mut vehicle.state,
                        &mut vehicle.memory,
                        &mut helper,
                    ),
                    Err(err) => Err(err),
                };

            report.behaviors_run += 1;
            if let Err(err) = outcome {
                warn!("{} stalled on tick {}: {}", vehicle.id, self.tick, err);
                report.failures.push((vehicle.id, err));
            }
        }

        report
    }

    /// Front, back and center points of every vehicle in world coordinates
    pub fn snapshot(&self) -> Vec<VehicleSnapshot> {
        self.vehicles
            .iter()
            .filter_map(|vehicle| {
                let road = self.network.road(vehicle.placement.road_id).ok()?;
                let half = vehicle.state.length / 2.0;
                let position = vehicle.placement.position;
                Some(VehicleSnapshot {
                    id: vehicle.id,
                    road_id: road.id,
                    front: road.point_at(position + half),
                    back: road.point_at(position - half),
                    center: road.point_at(position),
                })
            })
            .collect()
    }
}
