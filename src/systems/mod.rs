//! Application systems
//!
//! Systems that drive a physics world from outside the core.

mod simulation;

pub use simulation::{SimulationResult, SimulationSystem, DEFAULT_FIXED_DT, DEFAULT_MAX_DT};
