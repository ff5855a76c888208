//! 2D platformer physics for plat2d
//!
//! This crate provides the collision core of a side-scrolling platformer:
//! - Axis-aligned hitboxes and the resolution-axis heuristic
//! - Static blocks, moving platforms, and event-publishing blocks
//! - Dynamic entities with gravity, drag, ground sensing and jumping
//! - A world that steps everything in a fixed, deterministic order

pub mod body;
pub mod collision;
pub mod entity;
pub mod error;
pub mod events;
pub mod shapes;
pub mod world;

// Re-export commonly used types
pub use body::{Block, BlockKey, EntityKey, Kinematic, KinematicBlock, StaticBlock, DEFAULT_PLATFORM_FRICTION, PATH_TOLERANCE};
pub use collision::{aabb_overlaps, penetration_axis, separation, Axis, ContactSides, Penetration};
pub use entity::{
    DynamicEntity, EntityController, CEILING_NUDGE, DEFAULT_COLLISION_SLOP, DEFAULT_DRAG_FACTOR, DEFAULT_GRAVITY,
    DEFAULT_GROUND_SENSOR_DEPTH,
};
pub use error::RegistrationError;
pub use events::{CollisionEvent, EventBlock, EventFlow, EventSink, HookContext, DEFAULT_COLLISION_EVENT, DEFAULT_TOUCHING_EVENT};
pub use shapes::Hitbox;
pub use world::{PhysicsConfig, PhysicsWorld};
