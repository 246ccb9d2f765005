//! Error conditions raised by the simulation core

use thiserror::Error;

use super::types::{Point, RoadId, VehicleId};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("{id} does not exist (network has {count} roads)")]
    RoadNotFound { id: RoadId, count: usize },

    #[error("{0} does not exist")]
    VehicleNotFound(VehicleId),

    #[error("road from ({:.1}, {:.1}) to ({:.1}, {:.1}) has zero length", .start.x, .start.y, .end.x, .end.y)]
    DegenerateRoad { start: Point, end: Point },

    #[error("road from ({:.1e}, {:.1e}) to ({:.1e}, {:.1e}) is too long to measure", .start.x, .start.y, .end.x, .end.y)]
    RoadTooLong { start: Point, end: Point },

    #[error("road endpoints must be finite coordinates")]
    NonFiniteCoordinate,

    #[error("speed limit must be positive and finite (got {0})")]
    InvalidSpeedLimit(f32),

    #[error("road network has no roads")]
    EmptyNetwork,

    #[error("no free spawn point with separation {min_separation:.2} after {attempts} attempts")]
    NoSpawnSpace { attempts: u32, min_separation: f32 },

    /// The road has no successor to continue onto
    #[error("{road} is a dead end")]
    DeadEnd { road: RoadId },

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, SimError>;
