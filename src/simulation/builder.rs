//! Composition root: wires a scenario, the vehicle engine, a renderer and the
//! fixed-step scheduler into a session that can be started and stopped.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use anyhow::{Context, Result};
use log::{info, warn};

use super::behavior::Behavior;
use super::config::SimConfig;
use super::engine::VehicleSimulation;
use super::render::Renderer;
use super::scenario::Scenario;
use super::scheduler::{
    Clock, FixedStepScheduler, FramePacer, FrameTiming, SchedulerState, SystemClock,
};

/// Running totals collected by the physics callback
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub steps: u64,
    pub behavior_runs: u64,
    pub behavior_failures: u64,
    pub frames: u64,
}

pub struct SimulationBuilder<C: Clock + Clone = SystemClock> {
    config: SimConfig,
    clock: C,
}

impl SimulationBuilder<SystemClock> {
    pub fn new(config: SimConfig) -> Self {
        Self::with_clock(config, SystemClock::default())
    }
}

impl<C: Clock + Clone + 'static> SimulationBuilder<C> {
    pub fn with_clock(config: SimConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Builds the network, places `vehicle_count` vehicles without overlap and
    /// wires the scheduler callbacks. The session starts stopped.
    pub fn build(
        &self,
        scenario: &Scenario,
        vehicle_count: usize,
        behavior: Rc<dyn Behavior>,
        renderer: impl Renderer + 'static,
    ) -> Result<TrafficSession<C>> {
        self.config.validate().context("Invalid simulation config")?;

        let network = scenario.create_network()?;
        let dead_ends = network.dead_ends();
        if !dead_ends.is_empty() {
            warn!(
                "Scenario '{}' has {} dead-end roads; vehicles reaching them will stall",
                scenario.name,
                dead_ends.len()
            );
        }

        let mut simulation = VehicleSimulation::new(network, &self.config);
        for i in 0..vehicle_count {
            simulation
                .spawn_random(
                    self.config.vehicle_length,
                    self.config.min_separation,
                    Rc::clone(&behavior),
                )
                .with_context(|| {
                    format!("Could not place vehicle {} of {}", i + 1, vehicle_count)
                })?;
        }
        info!(
            "Built scenario '{}' with {} roads and {} vehicles",
            scenario.name,
            simulation.network().len(),
            simulation.len()
        );

        let road_snapshot = simulation.network().snapshot();
        let simulation = Rc::new(RefCell::new(simulation));
        let stats = Rc::new(RefCell::new(SessionStats::default()));

        let physics = {
            let simulation = Rc::clone(&simulation);
            let stats = Rc::clone(&stats);
            move |_: &FrameTiming| {
                let report = simulation.borrow_mut().step();
                let mut stats = stats.borrow_mut();
                stats.steps += 1;
                stats.behavior_runs += report.behaviors_run as u64;
                stats.behavior_failures += report.failures.len() as u64;
            }
        };

        let draw = {
            let simulation = Rc::clone(&simulation);
            let stats = Rc::clone(&stats);
            let mut renderer = renderer;
            move |timing: &FrameTiming| {
                let vehicles = simulation.borrow().snapshot();
                renderer.draw(timing, &road_snapshot, &vehicles);
                stats.borrow_mut().frames += 1;
            }
        };

        let scheduler = FixedStepScheduler::new(self.clock.clone(), &self.config, physics, draw)?;

        Ok(TrafficSession {
            scenario_name: scenario.name,
            simulation,
            scheduler,
            stats,
        })
    }
}

/// A built simulation with its scheduler
pub struct TrafficSession<C: Clock = SystemClock> {
    scenario_name: &'static str,
    simulation: Rc<RefCell<VehicleSimulation>>,
    scheduler: FixedStepScheduler<C>,
    stats: Rc<RefCell<SessionStats>>,
}

impl<C: Clock> TrafficSession<C> {
    pub fn start(&mut self) {
        self.scheduler.start();
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Runs one host frame
    pub fn frame(&mut self) -> bool {
        self.scheduler.frame()
    }

    pub fn run<P: FramePacer>(&mut self, pacer: &mut P) -> u64 {
        self.scheduler.run(pacer)
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn scenario_name(&self) -> &'static str {
        self.scenario_name
    }

    /// Borrows the simulation shared with the physics callback.
    ///
    /// Drop the returned guard before the next `frame()` or `run()`; a guard
    /// still alive when physics runs makes the step's `borrow_mut` panic.
    /// [`TrafficSession::with_simulation`] scopes the borrow instead.
    pub fn simulation(&self) -> Ref<'_, VehicleSimulation> {
        self.simulation.borrow()
    }

    /// Runs `f` against the simulation, releasing the borrow before returning
    pub fn with_simulation<R>(&self, f: impl FnOnce(&VehicleSimulation) -> R) -> R {
        f(&self.simulation.borrow())
    }

    pub fn scheduler(&self) -> &FixedStepScheduler<C> {
        &self.scheduler
    }

    pub fn stats(&self) -> SessionStats {
        *self.stats.borrow()
    }

    /// Logs the end-of-run statistics
    pub fn log_summary(&self) {
        let stats = self.stats();
        let simulation = self.simulation();
        info!("=== SIMULATION COMPLETE ===");
        info!("Scenario: {}", self.scenario_name);
        info!("Elapsed time: {:.2}s", self.scheduler.timing().running / 1000.0);
        info!("Physics steps: {}", stats.steps);
        info!("Dropped steps: {}", self.scheduler.dropped_calls());
        info!("Frames drawn: {}", stats.frames);
        info!("Total roads: {}", simulation.network().len());
        info!("Active vehicles: {}", simulation.len());
        info!("Behavior failures: {}", stats.behavior_failures);
    }
}

/// Owns at most one session; starting again rebuilds from scratch
pub struct TrafficController<C: Clock + Clone = SystemClock> {
    builder: SimulationBuilder<C>,
    session: Option<TrafficSession<C>>,
}

impl<C: Clock + Clone + 'static> TrafficController<C> {
    pub fn new(builder: SimulationBuilder<C>) -> Self {
        Self {
            builder,
            session: None,
        }
    }

    /// Stops any current session, then builds and starts a new one
    pub fn start(
        &mut self,
        scenario: &Scenario,
        vehicle_count: usize,
        behavior: Rc<dyn Behavior>,
        renderer: impl Renderer + 'static,
    ) -> Result<&mut TrafficSession<C>> {
        if let Some(mut previous) = self.session.take() {
            previous.stop();
            info!("Restarting: discarded session '{}'", previous.scenario_name());
        }

        let mut session = self
            .builder
            .build(scenario, vehicle_count, behavior, renderer)?;
        session.start();
        Ok(self.session.insert(session))
    }

    pub fn stop(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop();
        }
    }

    pub fn session(&self) -> Option<&TrafficSession<C>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut TrafficSession<C>> {
        self.session.as_mut()
    }
}
