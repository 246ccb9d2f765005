//! Directed network of straight road segments
//!
//! Roads are stored in insertion order so a road's id is its index. The
//! successor/predecessor lists are kept on each road for the simulation's
//! hot path, and mirrored into a petgraph graph for whole-network queries.

use log::debug;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use rand::seq::IndexedRandom;
use rand::Rng;

use super::error::{Result, SimError};
use super::types::{Point, RoadId, DEFAULT_SPEED_LIMIT};

/// A directed road segment
#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    pub id: RoadId,
    pub start: Point,
    pub end: Point,
    pub speed_limit: f32,
    /// Euclidean length of the segment
    pub distance: f32,
    /// Unit vector pointing from `start` to `end`
    pub unit: Point,
    /// Roads this one feeds into, in connection order
    pub connects_to: Vec<RoadId>,
    /// Roads feeding into this one, in connection order
    pub connects_from: Vec<RoadId>,
    /// Reserved for enabling/disabling roads; always true for now
    pub active: bool,
}

impl Road {
    fn new(id: RoadId, start: Point, end: Point, speed_limit: f32) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(SimError::NonFiniteCoordinate);
        }
        if !(speed_limit.is_finite() && speed_limit > 0.0) {
            return Err(SimError::InvalidSpeedLimit(speed_limit));
        }

        let distance = start.distance(&end);
        if distance <= 0.0 {
            return Err(SimError::DegenerateRoad { start, end });
        }
        // Finite endpoints can still be far enough apart to overflow
        if !distance.is_finite() {
            return Err(SimError::RoadTooLong { start, end });
        }
        let delta = end - start;
        let unit = Point::new(delta.x / distance, delta.y / distance);

        Ok(Self {
            id,
            start,
            end,
            speed_limit,
            distance,
            unit,
            connects_to: Vec::new(),
            connects_from: Vec::new(),
            active: true,
        })
    }

    /// World position `offset` units along the road from its start
    pub fn point_at(&self, offset: f32) -> Point {
        self.start.along(&self.unit, offset)
    }

    pub fn is_dead_end(&self) -> bool {
        self.connects_to.is_empty()
    }
}

/// Render-ready description of a road
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadSnapshot {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub active: bool,
}

#[derive(Debug, Default, Clone)]
pub struct RoadNetwork {
    roads: Vec<Road>,

    /// Mirror of the adjacency; node index `n` is road `n`
    graph: DiGraph<RoadId, ()>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a straight road and returns its id
    pub fn add_road(
        &mut self,
        start: impl Into<Point>,
        end: impl Into<Point>,
        speed_limit: Option<f32>,
    ) -> Result<RoadId> {
        let id = RoadId(self.roads.len());
        let road = Road::new(
            id,
            start.into(),
            end.into(),
            speed_limit.unwrap_or(DEFAULT_SPEED_LIMIT),
        )?;

        debug!(
            "Added {} from ({:.1}, {:.1}) to ({:.1}, {:.1}), length {:.2}",
            id, road.start.x, road.start.y, road.end.x, road.end.y, road.distance
        );

        self.graph.add_node(id);
        self.roads.push(road);
        Ok(id)
    }

    /// Lets traffic flow from `from` onto `to`
    pub fn connect(&mut self, from: RoadId, to: RoadId) -> Result<()> {
        // Validate both ends before touching either list
        self.road(from)?;
        self.road(to)?;

        self.roads[from.0].connects_to.push(to);
        self.roads[to.0].connects_from.push(from);
        self.graph
            .add_edge(NodeIndex::new(from.0), NodeIndex::new(to.0), ());

        debug!("Connected {} -> {}", from, to);
        Ok(())
    }

    pub fn road(&self, id: RoadId) -> Result<&Road> {
        self.roads.get(id.0).ok_or(SimError::RoadNotFound {
            id,
            count: self.roads.len(),
        })
    }

    /// Picks a road uniformly at random, ignoring length and connectivity
    pub fn pick_random_road<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Road> {
        self.roads.choose(rng).ok_or(SimError::EmptyNetwork)
    }

    pub fn snapshot(&self) -> Vec<RoadSnapshot> {
        self.roads
            .iter()
            .map(|road| RoadSnapshot {
                x1: road.start.x,
                y1: road.start.y,
                x2: road.end.x,
                y2: road.end.y,
                active: road.active,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    pub fn roads(&self) -> impl Iterator<Item = &Road> {
        self.roads.iter()
    }

    /// Roads with no successor
    pub fn dead_ends(&self) -> Vec<RoadId> {
        self.roads
            .iter()
            .filter(|road| road.is_dead_end())
            .map(|road| road.id)
            .collect()
    }

    /// True when every road can be reached from every other road
    pub fn is_strongly_connected(&self) -> bool {
        !self.roads.is_empty() && kosaraju_scc(&self.graph).len() == 1
    }

    /// All roads a vehicle could eventually drive onto from `from`, including itself
    pub fn reachable_from(&self, from: RoadId) -> Result<Vec<RoadId>> {
        self.road(from)?;

        let mut dfs = Dfs::new(&self.graph, NodeIndex::new(from.0));
        let mut reachable = Vec::new();
        while let Some(node) = dfs.next(&self.graph) {
            reachable.push(self.graph[node]);
        }
        reachable.sort();
        Ok(reachable)
    }
}
