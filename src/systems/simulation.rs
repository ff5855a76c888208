//! Fixed-timestep simulation driver
//!
//! Turns variable frame deltas into a whole number of fixed physics steps:
//! - Delta time measurement (or caller-supplied deltas)
//! - Clamping of oversized frames
//! - Accumulation into fixed steps
//! - Stopping once the world has ended

use std::time::Instant;
use plat2d_physics::PhysicsWorld;

use crate::config::SimulationConfig;

/// Fixed step used when a configured one is unusable
pub const DEFAULT_FIXED_DT: f32 = 1.0 / 60.0;

/// Largest frame delta accepted by default
pub const DEFAULT_MAX_DT: f32 = 0.25;

/// Result of a simulation update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    /// Physics steps run this frame
    pub steps: u32,
    /// Whether the world has ended (further updates do nothing)
    pub ended: bool,
}

/// Drives a physics world with a fixed timestep
///
/// The first frame always advances by exactly one fixed step, since there
/// is no previous frame to measure against.
pub struct SimulationSystem {
    fixed_dt: f32,
    max_dt: f32,
    accumulator: f32,
    first_frame: bool,
    last_frame: Option<Instant>,
    total_steps: u64,
}

impl SimulationSystem {
    /// Create a simulation system
    ///
    /// An unusable `fixed_dt` falls back to 60 Hz; `max_dt` is raised to at
    /// least one fixed step.
    pub fn new(fixed_dt: f32, max_dt: f32) -> Self {
        let fixed_dt = if fixed_dt.is_finite() && fixed_dt > 0.0 {
            fixed_dt
        } else {
            log::warn!("Fixed timestep {} is unusable, using {}", fixed_dt, DEFAULT_FIXED_DT);
            DEFAULT_FIXED_DT
        };
        let max_dt = if max_dt.is_finite() { max_dt.max(fixed_dt) } else { DEFAULT_MAX_DT.max(fixed_dt) };

        Self {
            fixed_dt,
            max_dt,
            accumulator: 0.0,
            first_frame: true,
            last_frame: None,
            total_steps: 0,
        }
    }

    /// Create a simulation system from configuration
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.fixed_dt, config.max_dt)
    }

    /// Fixed physics timestep
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Physics steps run since creation
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Fraction of a fixed step left over in the accumulator (0..1)
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.fixed_dt).clamp(0.0, 1.0)
    }

    /// Run one frame, measuring the delta from the wall clock
    pub fn update(&mut self, world: &mut PhysicsWorld) -> SimulationResult {
        let now = Instant::now();
        let raw_dt = self
            .last_frame
            .map(|last| (now - last).as_secs_f32())
            .unwrap_or(self.fixed_dt);
        self.last_frame = Some(now);
        self.advance(world, raw_dt)
    }

    /// Run one frame with a caller-supplied delta
    pub fn advance(&mut self, world: &mut PhysicsWorld, frame_dt: f32) -> SimulationResult {
        if world.is_ended() {
            return SimulationResult { steps: 0, ended: true };
        }

        let dt = if self.first_frame {
            self.first_frame = false;
            self.fixed_dt
        } else if frame_dt.is_finite() {
            // Cap dt to prevent a spiral of death after a stall
            frame_dt.clamp(0.0, self.max_dt)
        } else {
            log::warn!("Ignoring non-finite frame delta {}", frame_dt);
            0.0
        };
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= self.fixed_dt {
            world.step(self.fixed_dt);
            self.accumulator -= self.fixed_dt;
            steps += 1;

            if world.is_ended() {
                log::info!("World ended after {} steps", self.total_steps + steps as u64);
                self.accumulator = 0.0;
                break;
            }
        }
        self.total_steps += steps as u64;

        SimulationResult {
            steps,
            ended: world.is_ended(),
        }
    }

    /// Run exactly one fixed step, ignoring the accumulator
    pub fn step_once(&mut self, world: &mut PhysicsWorld) -> SimulationResult {
        if world.is_ended() {
            return SimulationResult { steps: 0, ended: true };
        }
        world.step(self.fixed_dt);
        self.total_steps += 1;
        SimulationResult {
            steps: 1,
            ended: world.is_ended(),
        }
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_DT, DEFAULT_MAX_DT)
    }
}
