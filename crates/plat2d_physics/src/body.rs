//! Block types for 2D platformer physics
//!
//! Blocks are the bodies dynamic entities collide against. Every block
//! implements [`Block`]; the world only ever talks to that interface.
//! Blocks with scripted motion additionally expose [`Kinematic`].

use crate::entity::DynamicEntity;
use crate::events::HookContext;
use crate::shapes::Hitbox;
use plat2d_math::Vec2;
use slotmap::new_key_type;

/// Default friction between a moving platform and a riding entity
pub const DEFAULT_PLATFORM_FRICTION: f32 = 0.5;

/// Reversal tolerance per second of step time
///
/// Scaled by `dt` so the slack stays proportional to the step size.
pub const PATH_TOLERANCE: f32 = 1.0e-3;

/// Paths shorter than this are treated as stationary
const MIN_PATH_LENGTH: f32 = 1.0e-6;

new_key_type! {
    /// Key to a block in the physics world
    pub struct BlockKey;
}

new_key_type! {
    /// Key to a dynamic entity in the physics world
    pub struct EntityKey;
}

/// Capability interface for anything entities can collide against
///
/// The two hooks decide what a contact does to the entity. They fire at
/// fixed points of the collision pass; replacing them changes what happens,
/// never when.
pub trait Block {
    /// Collision box in world space
    fn hitbox(&self) -> &Hitbox;

    /// Top-left position (the hitbox anchor)
    fn position(&self) -> Vec2;

    /// Width and height
    fn size(&self) -> Vec2;

    /// Current velocity; zero for blocks that never move
    fn velocity(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// The update capability, if this block moves on its own
    fn as_kinematic_mut(&mut self) -> Option<&mut dyn Kinematic> {
        None
    }

    /// Called after `entity` has been pushed out of this block
    ///
    /// `direction` points from the entity toward the block. The default
    /// behaves like a solid wall and stops the entity dead.
    fn on_collision(&self, entity: &mut DynamicEntity, _direction: Vec2, _ctx: &mut HookContext<'_>) {
        entity.set_velocity(Vec2::ZERO);
    }

    /// Called when the entity's ground sensor rests on this block
    fn touching(&self, _entity: &mut DynamicEntity, _ctx: &mut HookContext<'_>) {}
}

/// Blocks with scripted motion, advanced once per step before entities move
pub trait Kinematic {
    /// Advance the scripted motion by `dt` seconds
    fn update(&mut self, dt: f32);

    /// Whether the motion changed direction during the last update
    fn just_reversed(&self) -> bool;
}

/// An immovable block
#[derive(Clone, Debug)]
pub struct StaticBlock {
    position: Vec2,
    size: Vec2,
    hitbox: Hitbox,
}

impl StaticBlock {
    /// Create a block covering `position .. position + size`
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            hitbox: Hitbox::from_size(size, position),
        }
    }
}

impl Block for StaticBlock {
    fn hitbox(&self) -> &Hitbox {
        &self.hitbox
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn size(&self) -> Vec2 {
        self.size
    }
}

/// A moving platform travelling back and forth along a straight path
#[derive(Clone, Debug)]
pub struct KinematicBlock {
    position: Vec2,
    size: Vec2,
    hitbox: Hitbox,
    path_start: Vec2,
    path_end: Vec2,
    velocity: Vec2,
    just_reversed: bool,
    /// Share of an entity's velocity relative to the platform removed per contact
    pub friction: f32,
}

impl KinematicBlock {
    /// Create a platform starting at `start` that reaches `end` after `route_time` seconds
    ///
    /// A zero-length path or an unusable route time gives a stationary platform.
    pub fn new(start: Vec2, end: Vec2, route_time: f32, size: Vec2) -> Self {
        let path = end - start;
        let velocity = if path.length() <= MIN_PATH_LENGTH {
            log::warn!("Kinematic block path {:?} -> {:?} has zero length; block is stationary", start, end);
            Vec2::ZERO
        } else if !route_time.is_finite() || route_time <= 0.0 {
            log::warn!("Kinematic block route time {} is unusable; block is stationary", route_time);
            Vec2::ZERO
        } else {
            path * (1.0 / route_time)
        };

        Self {
            position: start,
            size,
            hitbox: Hitbox::from_size(size, start),
            path_start: start,
            path_end: end,
            velocity,
            just_reversed: false,
            friction: DEFAULT_PLATFORM_FRICTION,
        }
    }

    /// Set the platform friction (clamped to `[0, 1]`)
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.clamp(0.0, 1.0);
        self
    }

    /// Whether the platform never moves
    pub fn is_stationary(&self) -> bool {
        self.velocity == Vec2::ZERO
    }

    /// Endpoint the platform is currently heading to
    fn target(&self) -> Vec2 {
        if self.velocity.dot(self.path_end - self.path_start) > 0.0 {
            self.path_end
        } else {
            self.path_start
        }
    }
}

impl Block for KinematicBlock {
    fn hitbox(&self) -> &Hitbox {
        &self.hitbox
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn as_kinematic_mut(&mut self) -> Option<&mut dyn Kinematic> {
        Some(self)
    }

    /// The entity catches the platform's motion, then friction applies
    ///
    /// A rider on a platform moving away from it overlaps again every
    /// frame, so its velocity settles at `velocity / friction` rather than
    /// the platform's own. Its position still tracks the platform top.
    fn on_collision(&self, entity: &mut DynamicEntity, _direction: Vec2, ctx: &mut HookContext<'_>) {
        entity.add_velocity(self.velocity);
        self.touching(entity, ctx);
    }

    /// Pull the entity's velocity toward the platform's
    fn touching(&self, entity: &mut DynamicEntity, _ctx: &mut HookContext<'_>) {
        let relative = entity.velocity() - self.velocity;
        let retained = 1.0 - self.friction;
        entity.set_velocity(self.velocity + relative * retained);
    }
}

impl Kinematic for KinematicBlock {
    fn update(&mut self, dt: f32) {
        self.just_reversed = false;
        if self.is_stationary() {
            return;
        }

        let travelled = self.velocity * dt;
        self.position += travelled;
        self.hitbox.reposition(self.position);

        // Signed distance left to the endpoint along the direction of travel;
        // negative once the endpoint has been passed
        let heading = self.velocity.normalized();
        let remaining = (self.target() - self.position).dot(heading);
        if remaining < travelled.length() + PATH_TOLERANCE * dt {
            self.velocity = -self.velocity;
            self.just_reversed = true;
            log::trace!("Kinematic block reversed at {:?}", self.position);
        }
    }

    fn just_reversed(&self) -> bool {
        self.just_reversed
    }
}
