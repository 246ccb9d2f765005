//! Core types for the traffic simulation
//!
//! Identifiers, plane geometry and the default tuning constants.

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Index of a road inside its network (position in the road list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoadId(pub usize);

/// Index of a vehicle inside its simulation (spawn order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub usize);

impl fmt::Display for RoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "road#{}", self.0)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vehicle#{}", self.0)
    }
}

/// A 2D point (or vector) in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Point reached by walking `offset` units along `direction` from here
    pub fn along(&self, direction: &Point, offset: f32) -> Point {
        *self + *direction * offset
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// Speed limit given to roads authored without one
pub const DEFAULT_SPEED_LIMIT: f32 = 1.0;

/// Physics steps per second
pub const DEFAULT_PHYSICS_RATE: f64 = 15.0;

/// Highest physics rate a config may ask for
pub const MAX_PHYSICS_RATE: f64 = 1000.0;

/// Most physics steps a single frame may run before excess ones are dropped
pub const DEFAULT_MAX_CATCH_UP: u32 = 30;

/// Length of a spawned vehicle in world units
pub const DEFAULT_VEHICLE_LENGTH: f32 = 5.0;

/// Minimum gap between vehicles placed by the spawn search
pub const DEFAULT_MIN_SEPARATION: f32 = 5.0;

/// Random placements tried before the spawn search gives up
pub const DEFAULT_MAX_SPAWN_ATTEMPTS: u32 = 1000;

