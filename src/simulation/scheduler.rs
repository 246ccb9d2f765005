//! Fixed-timestep scheduler
//!
//! The host drives frames at whatever rate it can (a render loop, a timer, a
//! test). Each frame the scheduler runs as many physics steps as are needed
//! to keep `physics_calls` in line with `elapsed * rate`, then draws once.

use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use super::config::SimConfig;
use super::error::Result;

/// Timing handed to both callbacks; all values in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Clock reading of the previous frame
    pub prev: f64,
    /// Clock reading of this frame
    pub now: f64,
    /// Time since `start()`
    pub running: f64,
    /// Time since the previous frame
    pub elapse: f64,
}

/// Monotonic millisecond clock
pub trait Clock {
    fn now_ms(&self) -> f64;
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock moved by hand; clones share the same reading
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// The host's way of waiting for the next frame
pub trait FramePacer {
    /// Blocks until the next frame is due; `false` when the host is shutting down
    fn next_frame(&mut self) -> bool;
}

/// Sleeps a fixed interval between frames until an optional deadline passes
#[derive(Debug, Clone)]
pub struct SleepPacer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl SleepPacer {
    pub fn new(frames_per_second: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / f64::from(frames_per_second.max(1))),
            deadline: None,
        }
    }

    /// A duration past what `Instant` can represent runs without a deadline
    pub fn for_duration(frames_per_second: u32, duration: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(duration),
            ..Self::new(frames_per_second)
        }
    }
}

impl FramePacer for SleepPacer {
    fn next_frame(&mut self) -> bool {
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return false;
        }
        thread::sleep(self.interval);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

pub type FrameCallback = Box<dyn FnMut(&FrameTiming)>;

pub struct FixedStepScheduler<C: Clock = SystemClock> {
    clock: C,
    physics: FrameCallback,
    draw: FrameCallback,
    physics_rate: f64,
    max_catch_up: Option<u32>,
    state: SchedulerState,
    start: f64,
    timing: FrameTiming,
    physics_calls: u64,
    dropped_calls: u64,
}

impl<C: Clock> FixedStepScheduler<C> {
    pub fn new(
        clock: C,
        config: &SimConfig,
        physics: impl FnMut(&FrameTiming) + 'static,
        draw: impl FnMut(&FrameTiming) + 'static,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            clock,
            physics: Box::new(physics),
            draw: Box::new(draw),
            physics_rate: config.physics_rate,
            max_catch_up: config.max_catch_up,
            state: SchedulerState::Stopped,
            start: -1.0,
            timing: FrameTiming {
                prev: -1.0,
                now: 0.0,
                running: 1.0,
                elapse: 1.0,
            },
            physics_calls: 0,
            dropped_calls: 0,
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Physics steps issued since the last `start()`, dropped ones included
    pub fn physics_calls(&self) -> u64 {
        self.physics_calls
    }

    /// Physics steps skipped by the catch-up cap since the last `start()`
    pub fn dropped_calls(&self) -> u64 {
        self.dropped_calls
    }

    pub fn timing(&self) -> FrameTiming {
        self.timing
    }

    /// Starts from a fresh clock; ignored while already running
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let now = self.clock.now_ms();
        self.start = now;
        self.timing = FrameTiming {
            prev: now - 1.0,
            now: now + 1.0,
            running: 1.0,
            elapse: 1.0,
        };
        self.physics_calls = 0;
        self.dropped_calls = 0;
        self.state = SchedulerState::Running;

        info!("Scheduler started at {:.0} steps/s", self.physics_rate);
    }

    /// Halts after the current frame; safe to call repeatedly
    pub fn stop(&mut self) {
        if self.is_running() {
            info!(
                "Scheduler stopped after {} physics steps",
                self.physics_calls
            );
        }
        self.state = SchedulerState::Stopped;
    }

    /// Runs one frame. Returns whether another frame should be requested.
    pub fn frame(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        let now = self.clock.now_ms();
        self.timing.prev = self.timing.now;
        self.timing.now = now;
        self.timing.running = now - self.start;
        self.timing.elapse = now - self.timing.prev;

        self.run_physics();
        (self.draw)(&self.timing);

        self.is_running()
    }

    fn run_physics(&mut self) {
        let target_calls = self.timing.running * self.physics_rate / 1000.0;

        let mut issued: u32 = 0;
        while target_calls > self.physics_calls as f64 {
            if self.max_catch_up.is_some_and(|cap| issued >= cap) {
                // Skip ahead rather than fall further behind
                let behind = (target_calls.ceil() as u64).saturating_sub(self.physics_calls);
                self.physics_calls = self.physics_calls.saturating_add(behind);
                self.dropped_calls = self.dropped_calls.saturating_add(behind);
                warn!(
                    "Physics fell behind by {} steps at {:.0}ms; dropping them",
                    behind, self.timing.running
                );
                break;
            }

            (self.physics)(&self.timing);
            self.physics_calls = self.physics_calls.saturating_add(1);
            issued += 1;
        }
    }

    /// Starts if needed, then drives frames until stopped or the pacer gives up.
    /// Returns the number of frames run.
    pub fn run<P: FramePacer>(&mut self, pacer: &mut P) -> u64 {
        self.start();

        let mut frames = 0;
        while self.frame() {
            frames += 1;
            if !pacer.next_frame() {
                self.stop();
            }
        }
        frames
    }
}
