//! Vehicle records owned by the simulation engine

use std::fmt;
use std::rc::Rc;

use super::behavior::{Behavior, BehaviorState};
use super::types::{Point, RoadId, VehicleId};

/// The part of a vehicle its behavior may read and write directly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub length: f32,
    /// Not applied by the engine; behaviors decide what speed means
    pub speed: f32,
}

/// Where a vehicle is on the network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub road_id: RoadId,
    /// Offset from the road's start point; never clamped by the engine
    pub position: f32,
}

pub struct Vehicle {
    pub id: VehicleId,
    pub state: VehicleState,
    pub placement: Placement,
    pub(crate) memory: BehaviorState,
    pub(crate) behavior: Rc<dyn Behavior>,
}

impl Vehicle {
    pub(crate) fn new(
        id: VehicleId,
        length: f32,
        placement: Placement,
        behavior: Rc<dyn Behavior>,
    ) -> Self {
        Self {
            id,
            state: VehicleState { length, speed: 0.0 },
            placement,
            memory: BehaviorState::new(),
            behavior,
        }
    }

    pub fn road_id(&self) -> RoadId {
        self.placement.road_id
    }

    pub fn position(&self) -> f32 {
        self.placement.position
    }

    /// The behavior's private memory, read-only
    pub fn memory(&self) -> &BehaviorState {
        &self.memory
    }
}

impl fmt::Debug for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vehicle")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("placement", &self.placement)
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

/// Render-ready projection of a vehicle into world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub road_id: RoadId,
    pub front: Point,
    pub back: Point,
    pub center: Point,
}
