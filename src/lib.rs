//! Road Traffic Simulation Library
//!
//! Vehicles driving a directed road network under pluggable behaviors, stepped
//! at a fixed physics rate independent of how often the host draws.

pub mod simulation;
