//! Road layouts the simulation can be started with

use anyhow::{Context, Result};

use super::road_network::RoadNetwork;
use super::types::RoadId;

/// Builds a fixed road topology into an empty network
pub type ScenarioFn = fn(&mut RoadNetwork) -> Result<()>;

#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub build: ScenarioFn,
}

impl Scenario {
    pub const fn new(name: &'static str, build: ScenarioFn) -> Self {
        Self { name, build }
    }

    /// Creates a fresh network holding this layout
    pub fn create_network(&self) -> Result<RoadNetwork> {
        let mut network = RoadNetwork::new();
        (self.build)(&mut network)
            .with_context(|| format!("Failed to build scenario '{}'", self.name))?;
        Ok(network)
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario").field("name", &self.name).finish()
    }
}

/// Adds a chain of roads through `points` and connects them in order.
/// With `closed` the last road also feeds back into the first.
pub fn add_loop(
    network: &mut RoadNetwork,
    points: &[(f32, f32)],
    speed_limits: &[Option<f32>],
    closed: bool,
) -> Result<Vec<RoadId>> {
    let segment_count = if closed {
        points.len()
    } else {
        points.len().saturating_sub(1)
    };

    let mut ids = Vec::with_capacity(segment_count);
    for i in 0..segment_count {
        let start = points[i];
        let end = points[(i + 1) % points.len()];
        let limit = speed_limits.get(i).copied().flatten();
        ids.push(network.add_road(start, end, limit)?);
    }

    for pair in ids.windows(2) {
        network.connect(pair[0], pair[1])?;
    }
    if closed {
        if let (Some(&last), Some(&first)) = (ids.last(), ids.first()) {
            network.connect(last, first)?;
        }
    }
    Ok(ids)
}

fn trapezoid(network: &mut RoadNetwork) -> Result<()> {
    add_loop(
        network,
        &[(20.0, 20.0), (480.0, 20.0), (360.0, 300.0), (140.0, 300.0)],
        &[Some(3.0), Some(0.3), Some(3.0), Some(0.3)],
        true,
    )?;
    Ok(())
}

fn roundabout(network: &mut RoadNetwork) -> Result<()> {
    // Inner ring, roads 0..=4
    let ring = add_loop(
        network,
        &[
            (250.0, 50.0),
            (350.0, 150.0),
            (325.0, 300.0),
            (175.0, 300.0),
            (150.0, 150.0),
        ],
        &[],
        true,
    )?;

    // Outer detour: 7 leaves the ring after road 0 and rejoins via 5 or 6
    let west_exit = network.add_road((175.0, 300.0), (100.0, 300.0), None)?;
    let north_west = network.add_road((50.0, 250.0), (150.0, 150.0), None)?;
    let east_exit = network.add_road((350.0, 150.0), (450.0, 250.0), None)?;

    network.connect(west_exit, ring[2])?;
    network.connect(north_west, ring[4])?;
    network.connect(ring[0], east_exit)?;
    network.connect(east_exit, west_exit)?;
    network.connect(east_exit, north_west)?;
    Ok(())
}

pub const SCENARIOS: [Scenario; 2] = [
    Scenario::new("Trapezoid", trapezoid),
    Scenario::new("Road-a-bout", roundabout),
];

/// Finds a built-in scenario by name (case-insensitive) or by index
pub fn by_name(name: &str) -> Option<Scenario> {
    if let Ok(index) = name.parse::<usize>() {
        return SCENARIOS.get(index).copied();
    }
    SCENARIOS
        .iter()
        .find(|scenario| scenario.name.eq_ignore_ascii_case(name))
        .copied()
}
