//! Scene construction utilities
//!
//! This module provides a fluent API for building platformer levels in code.

mod scene_builder;

pub use scene_builder::{Scene, SceneBuilder, DEFAULT_FLOOR_THICKNESS, DEFAULT_WALL_THICKNESS};
