//! Standalone traffic simulation module
//!
//! Road network, vehicle engine and fixed-step scheduler. Drawing surfaces and
//! scenario selection plug in from outside through [`Renderer`] and
//! [`Scenario`].

mod behavior;
mod builder;
mod config;
mod engine;
mod error;
mod render;
mod road_network;
mod scenario;
mod scheduler;
mod types;
mod vehicle;

pub mod behaviors {
    //! Behavior trait, helper facade and the built-in behaviors
    pub use super::behavior::{
        by_name, from_fn, Basic, Behavior, BehaviorState, Cruise, DriveHelper, BEHAVIOR_NAMES,
    };
}

pub mod scenarios {
    //! Built-in road layouts
    pub use super::scenario::{add_loop, by_name, Scenario, ScenarioFn, SCENARIOS};
}

pub use behavior::{Behavior, BehaviorState, DriveHelper};
pub use builder::{SessionStats, SimulationBuilder, TrafficController, TrafficSession};
pub use config::SimConfig;
pub use engine::{SpawnPoint, StepReport, VehicleSimulation};
pub use error::{Result, SimError};
pub use render::{NullRenderer, Renderer, TerminalRenderer};
pub use road_network::{Road, RoadNetwork, RoadSnapshot};
pub use scenario::Scenario;
pub use scheduler::{
    Clock, FixedStepScheduler, FrameCallback, FramePacer, FrameTiming, ManualClock,
    SchedulerState, SleepPacer, SystemClock,
};
pub use types::{
    Point, RoadId, VehicleId, DEFAULT_MAX_CATCH_UP, DEFAULT_MAX_SPAWN_ATTEMPTS,
    DEFAULT_MIN_SEPARATION, DEFAULT_PHYSICS_RATE, DEFAULT_SPEED_LIMIT, DEFAULT_VEHICLE_LENGTH,
    MAX_PHYSICS_RATE,
};
pub use vehicle::{Placement, Vehicle, VehicleSnapshot, VehicleState};
