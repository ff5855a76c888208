//! 2D Mathematics Library
//!
//! This crate provides the 2D vector type shared by the plat2d crates.
//!
//! - [`Vec2`] - 2D vector with x, y components

mod vec2;

pub use vec2::Vec2;
