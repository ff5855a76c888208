//! plat2d - a 2D platformer physics sandbox
//!
//! The physics core lives in `plat2d_physics`; this crate wires it to
//! configuration files, a fixed-step frame driver, and a level builder.

pub mod config;
pub mod scene;
pub mod systems;
