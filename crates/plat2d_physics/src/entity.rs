//! Dynamic entities for platformer physics
//!
//! A dynamic entity integrates gravity, drag, accumulated acceleration and
//! velocity once per step, then is pushed out of every block it overlaps.
//! Standing contact is detected with a thin ground sensor below the hitbox.
//!
//! Ground state is deliberately one frame stale: `update` derives
//! `on_ground` from the sensor checks of the previous collision pass.
//! Landing is the exception and takes effect in the same pass, so a
//! falling entity stops immediately while leaving a ledge is noticed one
//! frame late.

use crate::body::{Block, BlockKey};
use crate::collision::{penetration_axis, Axis, ContactSides};
use crate::events::{EventFlow, HookContext};
use crate::shapes::Hitbox;
use plat2d_math::Vec2;

/// Default gravity (y grows downward)
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 980.0);

/// Default horizontal drag factor applied per airborne frame
pub const DEFAULT_DRAG_FACTOR: f32 = 0.98;

/// Default clearance left between a resolved entity and the block
pub const DEFAULT_COLLISION_SLOP: f32 = 0.01;

/// Default depth of the ground sensor below the hitbox
pub const DEFAULT_GROUND_SENSOR_DEPTH: f32 = 1.0;

/// Fraction of gravity used to push an entity off a ceiling it is stuck to
pub const CEILING_NUDGE: f32 = 0.1;

/// Post-update hook run after an entity's collision pass
pub trait EntityController {
    /// Called once per step after all blocks have been checked
    ///
    /// Returning [`EventFlow::EndWorld`] destroys the world before any
    /// later entity is processed.
    fn after_update(&mut self, entity: &mut DynamicEntity, dt: f32) -> EventFlow;
}

impl<F> EntityController for F
where
    F: FnMut(&mut DynamicEntity, f32) -> EventFlow,
{
    fn after_update(&mut self, entity: &mut DynamicEntity, dt: f32) -> EventFlow {
        self(entity, dt)
    }
}

/// A body moved by gravity, velocity and collisions
#[derive(Clone, Debug)]
pub struct DynamicEntity {
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    hitbox: Hitbox,
    ground_sensor: Hitbox,
    ground_sensor_depth: f32,
    on_ground: bool,
    ground_candidates: Vec<bool>,
    touching: Vec<BlockKey>,
    contacts: ContactSides,
    /// Gravity acceleration applied while airborne
    pub gravity: Vec2,
    /// Horizontal velocity multiplier applied each airborne frame
    pub drag_factor: f32,
    /// Clearance left between the entity and a block after resolution
    pub collision_slop: f32,
}

impl DynamicEntity {
    /// Create an entity at `position` with a hitbox covering `position .. position + size`
    pub fn new(position: Vec2, size: Vec2) -> Self {
        let hitbox = Hitbox::from_size(size, position);
        let ground_sensor = Self::sensor_for(&hitbox, DEFAULT_GROUND_SENSOR_DEPTH, position);
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            hitbox,
            ground_sensor,
            ground_sensor_depth: DEFAULT_GROUND_SENSOR_DEPTH,
            on_ground: false,
            ground_candidates: Vec::new(),
            touching: Vec::new(),
            contacts: ContactSides::empty(),
            gravity: DEFAULT_GRAVITY,
            drag_factor: DEFAULT_DRAG_FACTOR,
            collision_slop: DEFAULT_COLLISION_SLOP,
        }
    }

    /// Sensor spanning the hitbox width, extending `depth` below its bottom edge
    fn sensor_for(hitbox: &Hitbox, depth: f32, anchor: Vec2) -> Hitbox {
        let min = Vec2::new(hitbox.offset_min().x, hitbox.offset_max().y);
        let max = Vec2::new(hitbox.offset_max().x, hitbox.offset_max().y + depth);
        Hitbox::new(min, max, anchor)
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the gravity applied while airborne
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the horizontal drag factor
    pub fn with_drag_factor(mut self, drag_factor: f32) -> Self {
        self.drag_factor = drag_factor;
        self
    }

    /// Set the clearance left after collision resolution
    pub fn with_collision_slop(mut self, slop: f32) -> Self {
        self.collision_slop = slop.max(0.0);
        self
    }

    /// Use a hitbox that is offset from the entity's position
    pub fn with_hitbox_offsets(mut self, offset_min: Vec2, offset_max: Vec2) -> Self {
        self.hitbox = Hitbox::new(offset_min, offset_max, self.position);
        self.ground_sensor = Self::sensor_for(&self.hitbox, self.ground_sensor_depth, self.position);
        self
    }

    /// Set how far below the hitbox the ground sensor reaches
    pub fn with_ground_sensor_depth(mut self, depth: f32) -> Self {
        self.ground_sensor_depth = depth.max(0.0);
        self.ground_sensor = Self::sensor_for(&self.hitbox, self.ground_sensor_depth, self.position);
        self
    }

    /// Current position (the hitbox anchor)
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the entity, keeping both boxes in sync
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.hitbox.reposition(position);
        self.ground_sensor.reposition(position);
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Replace the velocity (used by block hooks)
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Add to the velocity immediately
    pub fn add_velocity(&mut self, velocity: Vec2) {
        self.velocity += velocity;
    }

    /// Queue an acceleration for the next update; cleared after it is applied
    pub fn add_acceleration(&mut self, acceleration: Vec2) {
        self.acceleration += acceleration;
    }

    /// Acceleration queued for the next update
    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    /// Collision box
    pub fn hitbox(&self) -> &Hitbox {
        &self.hitbox
    }

    /// Ground sensor box
    pub fn ground_sensor(&self) -> &Hitbox {
        &self.ground_sensor
    }

    /// Width and height of the hitbox
    pub fn size(&self) -> Vec2 {
        self.hitbox.size()
    }

    /// Hitbox center in world space
    pub fn center(&self) -> Vec2 {
        self.hitbox.center()
    }

    /// Whether the entity is standing on a block
    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Whether the entity is in the air
    pub fn is_airborne(&self) -> bool {
        !self.on_ground
    }

    /// Sensor results gathered during the current collision pass
    pub fn ground_candidates(&self) -> &[bool] {
        &self.ground_candidates
    }

    /// Blocks collided with or touched during the current step
    pub fn touching(&self) -> &[BlockKey] {
        &self.touching
    }

    /// Sides that made contact during the current step
    pub fn contacts(&self) -> ContactSides {
        self.contacts
    }

    /// Jump with the given upward speed if standing on a block
    ///
    /// Returns whether the jump happened.
    pub fn jump(&mut self, speed: f32) -> bool {
        if !self.on_ground {
            return false;
        }
        self.velocity.y -= speed;
        self.on_ground = false;
        true
    }

    /// Integrate one step
    pub fn update(&mut self, dt: f32) {
        self.touching.clear();
        self.contacts = ContactSides::empty();

        // Sensor results from the previous pass decide this frame's ground state
        self.on_ground = self.ground_candidates.iter().any(|&grounded| grounded);

        if !self.on_ground {
            self.velocity += self.gravity * dt;
            self.velocity.x *= self.drag_factor;
        }

        self.velocity += self.acceleration * dt;
        let position = self.position + self.velocity * dt;
        self.set_position(position);

        self.ground_candidates.clear();
        self.acceleration = Vec2::ZERO;
    }

    /// Test this entity against one block, resolving any overlap
    ///
    /// Returns true if the boxes overlapped. When they do not and the entity
    /// is standing, the ground sensor result is recorded for the next
    /// update and the block's `touching` hook fires on contact.
    pub fn check_collision(&mut self, block: &dyn Block, ctx: &mut HookContext<'_>) -> bool {
        if self.hitbox.overlaps(block.hitbox()) {
            self.resolve_collision(block, ctx);
            true
        } else if self.on_ground {
            let grounded = self.ground_sensor.overlaps(block.hitbox());
            self.ground_candidates.push(grounded);
            if grounded {
                self.touching.push(ctx.block_key());
                block.touching(self, ctx);
            }
            false
        } else {
            false
        }
    }

    /// Push the entity out of an overlapping block
    pub fn resolve_collision(&mut self, block: &dyn Block, ctx: &mut HookContext<'_>) {
        let bounds = *block.hitbox();
        let penetration = penetration_axis(&self.hitbox, &bounds);
        self.touching.push(ctx.block_key());

        match penetration.axis {
            Axis::Horizontal => {
                let x = if penetration.direction.x > 0.0 {
                    self.contacts |= ContactSides::RIGHT;
                    bounds.min().x - self.hitbox.offset_max().x - self.collision_slop
                } else {
                    self.contacts |= ContactSides::LEFT;
                    bounds.max().x - self.hitbox.offset_min().x + self.collision_slop
                };
                self.set_position(Vec2::new(x, self.position.y));
                block.on_collision(self, penetration.direction, ctx);
            }
            Axis::Vertical if penetration.direction.y > 0.0 => {
                let y = bounds.min().y - self.hitbox.offset_max().y - self.collision_slop;
                self.set_position(Vec2::new(self.position.x, y));
                self.contacts |= ContactSides::GROUND;
                block.on_collision(self, penetration.direction, ctx);

                // Landing counts immediately
                self.on_ground = true;
                self.ground_candidates.push(true);
                log::trace!("Entity landed at {:?}", self.position);
            }
            Axis::Vertical => {
                let rising = self.velocity.y < 0.0;
                let y = bounds.max().y - self.hitbox.offset_min().y + self.collision_slop;
                self.set_position(Vec2::new(self.position.x, y));
                self.contacts |= ContactSides::CEILING;
                block.on_collision(self, penetration.direction, ctx);

                if rising && self.velocity.y <= 0.0 {
                    self.velocity.y = self.gravity.y * CEILING_NUDGE;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{EntityKey, KinematicBlock, StaticBlock};

    const EPSILON: f32 = 0.0001;

    fn ctx() -> HookContext<'static> {
        HookContext::detached(EntityKey::default(), BlockKey::default())
    }

    fn floor() -> StaticBlock {
        StaticBlock::new(Vec2::new(0.0, 20.0), Vec2::new(100.0, 10.0))
    }

    #[test]
    fn test_new_entity() {
        let entity = DynamicEntity::new(Vec2::new(1.0, 2.0), Vec2::new(10.0, 10.0));
        assert_eq!(entity.position(), Vec2::new(1.0, 2.0));
        assert_eq!(entity.velocity(), Vec2::ZERO);
        assert!(!entity.on_ground());
        assert_eq!(entity.gravity, DEFAULT_GRAVITY);
        assert_eq!(entity.hitbox().min(), Vec2::new(1.0, 2.0));
        assert_eq!(entity.hitbox().max(), Vec2::new(11.0, 12.0));
    }

    #[test]
    fn test_ground_sensor_below_hitbox() {
        let entity = DynamicEntity::new(Vec2::ZERO, Vec2::new(10.0, 10.0)).with_ground_sensor_depth(2.0);
        assert_eq!(entity.ground_sensor().min(), Vec2::new(0.0, 10.0));
        assert_eq!(entity.ground_sensor().max(), Vec2::new(10.0, 12.0));
    }

    #[test]
    fn test_set_position_syncs_boxes() {
        let mut entity = DynamicEntity::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        entity.set_position(Vec2::new(5.0, 7.0));
        assert_eq!(entity.hitbox().min(), Vec2::new(5.0, 7.0));
        assert_eq!(entity.ground_sensor().min(), Vec2::new(5.0, 17.0));
    }

    #[test]
    fn test_update_applies_gravity_when_airborne() {
        let mut entity = DynamicEntity::new(Vec2::ZERO, Vec2::new(10.0, 10.0))
            .with_gravity(Vec2::new(0.0, 100.0));
        entity.update(0.1);
        assert!((entity.velocity().y - 10.0).abs() < EPSILON);
        assert!((entity.position().y - 1.0).abs() < EPSILON);
        assert_eq!(entity.hitbox().min(), entity.position());
    }

    #[test]
    fn test_update_applies_drag_when_airborne() {
        let mut entity = DynamicEntity::new(Vec2::ZERO, Vec2::new(10.0, 10.0))
            .with_gravity(Vec2::ZERO)
            .with_drag_factor(0.5)
            .with_velocity(Vec2::new(10.0, 0.0));
        entity.update(0.1);
        assert!((entity.velocity().x - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_acceleration_is_an_impulse() {
        let mut entity = DynamicEntity::new(Vec2::ZERO, Vec2::new(10.0, 10.0))
            .with_gravity(Vec2::ZERO)
            .with_drag_factor(1.0);
        entity.add_acceleration(Vec2::new(100.0, 0.0));
        entity.update(0.1);
        assert!((entity.velocity().x - 10.0).abs() < EPSILON);
        assert_eq!(entity.acceleration(), Vec2::ZERO);

        entity.update(0.1);
        assert!((entity.velocity().x - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_no_collision_no_mutation() {
        let block = floor();
        let mut entity = DynamicEntity::new(Vec2::new(0.0, -50.0), Vec2::new(10.0, 10.0))
            .with_velocity(Vec2::new(1.0, 2.0));
        let before = entity.clone();

        assert!(!entity.check_collision(&block, &mut ctx()));
        assert_eq!(entity.position(), before.position());
        assert_eq!(entity.velocity(), before.velocity());
        assert!(entity.ground_candidates().is_empty());
        assert!(entity.touching().is_empty());
    }

    #[test]
    fn test_landing_snaps_on_top_and_grounds_immediately() {
        let block = floor();
        let mut entity = DynamicEntity::new(Vec2::new(0.0, 11.0), Vec2::new(10.0, 10.0))
            .with_velocity(Vec2::new(0.0, 50.0));

        assert!(entity.check_collision(&block, &mut ctx()));
        assert_eq!(entity.position().y, 20.0 - 10.0 - entity.collision_slop);
        assert!(entity.on_ground());
        assert_eq!(entity.ground_candidates(), &[true]);
        assert!(entity.contacts().contains(ContactSides::GROUND));
        // Default block hook stops the entity
        assert_eq!(entity.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_resting_entity_records_sensor_contact() {
        let block = floor();
        let mut entity = DynamicEntity::new(Vec2::new(0.0, 11.0), Vec2::new(10.0, 10.0));
        entity.check_collision(&block, &mut ctx());
        entity.update(0.016);
        assert!(entity.on_ground());

        // Resting with slop clearance: no overlap, sensor hits
        assert!(!entity.check_collision(&block, &mut ctx()));
        assert_eq!(entity.ground_candidates(), &[true]);
        assert_eq!(entity.touching(), &[BlockKey::default()]);
    }

    #[test]
    fn test_walking_off_ledge_is_one_frame_late() {
        let ledge = StaticBlock::new(Vec2::new(0.0, 20.0), Vec2::new(10.0, 10.0));
        let mut entity = DynamicEntity::new(Vec2::new(0.0, 11.0), Vec2::new(10.0, 10.0))
            .with_gravity(Vec2::new(0.0, 100.0));
        entity.check_collision(&ledge, &mut ctx());

        // Step clear of the ledge horizontally
        entity.set_position(Vec2::new(30.0, entity.position().y));
        entity.update(0.016);
        assert!(entity.on_ground(), "ground state comes from last pass");
        assert!(!entity.check_collision(&ledge, &mut ctx()));
        assert_eq!(entity.ground_candidates(), &[false]);

        entity.update(0.016);
        assert!(!entity.on_ground());
        assert!(entity.velocity().y > 0.0);
    }

    #[test]
    fn test_wall_push_out_to_the_left() {
        let wall = StaticBlock::new(Vec2::new(50.0, 0.0), Vec2::new(10.0, 100.0));
        let mut entity = DynamicEntity::new(Vec2::new(42.0, 40.0), Vec2::new(10.0, 10.0))
            .with_velocity(Vec2::new(30.0, 5.0));

        assert!(entity.check_collision(&wall, &mut ctx()));
        assert_eq!(entity.position().x, 50.0 - 10.0 - entity.collision_slop);
        assert_eq!(entity.position().y, 40.0);
        assert!(entity.contacts().contains(ContactSides::RIGHT));
        assert_eq!(entity.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_wall_push_out_to_the_right() {
        let wall = StaticBlock::new(Vec2::new(50.0, 0.0), Vec2::new(10.0, 100.0));
        let mut entity = DynamicEntity::new(Vec2::new(58.0, 40.0), Vec2::new(10.0, 10.0));
        entity.check_collision(&wall, &mut ctx());
        assert_eq!(entity.position().x, 60.0 + entity.collision_slop);
        assert!(entity.contacts().contains(ContactSides::LEFT));
    }

    #[test]
    fn test_head_bump_nudges_downward() {
        let ceiling = StaticBlock::new(Vec2::new(-50.0, 0.0), Vec2::new(110.0, 10.0));
        let mut entity = DynamicEntity::new(Vec2::new(0.0, 9.5), Vec2::new(10.0, 10.0))
            .with_gravity(Vec2::new(0.0, 500.0))
            .with_velocity(Vec2::new(0.0, -200.0));

        assert!(entity.check_collision(&ceiling, &mut ctx()));
        assert_eq!(entity.position().y, 10.0 + entity.collision_slop);
        assert!((entity.velocity().y - 50.0).abs() < EPSILON);
        assert!(entity.contacts().contains(ContactSides::CEILING));
        assert!(!entity.on_ground());
    }

    #[test]
    fn test_offset_hitbox_resolution() {
        // Hitbox sits 2 units right and 4 units below the anchor
        let block = floor();
        let mut entity = DynamicEntity::new(Vec2::new(10.0, 0.0), Vec2::ZERO)
            .with_hitbox_offsets(Vec2::new(2.0, 4.0), Vec2::new(8.0, 12.0));
        entity.set_position(Vec2::new(10.0, 9.0));
        assert!(entity.check_collision(&block, &mut ctx()));
        assert_eq!(entity.position().y, 20.0 - 12.0 - entity.collision_slop);
        assert!(entity.hitbox().max().y < 20.0);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let block = floor();
        let mut entity = DynamicEntity::new(Vec2::new(0.0, 11.0), Vec2::new(10.0, 10.0));
        assert!(!entity.jump(300.0));
        assert_eq!(entity.velocity(), Vec2::ZERO);

        entity.check_collision(&block, &mut ctx());
        assert!(entity.jump(300.0));
        assert_eq!(entity.velocity().y, -300.0);
        assert!(!entity.on_ground());
    }

    #[test]
    fn test_platform_carries_resting_entity() {
        let platform = KinematicBlock::new(Vec2::new(0.0, 20.0), Vec2::new(100.0, 20.0), 1.0, Vec2::new(50.0, 5.0))
            .with_friction(0.5);
        let mut entity = DynamicEntity::new(Vec2::new(0.0, 11.0), Vec2::new(10.0, 10.0));

        entity.check_collision(&platform, &mut ctx());
        // on_collision adds platform velocity, touching halves the relative part
        assert!((entity.velocity().x - 100.0).abs() < EPSILON);

        entity.set_velocity(Vec2::ZERO);
        platform.touching(&mut entity, &mut ctx());
        assert!((entity.velocity().x - 50.0).abs() < EPSILON);
        platform.touching(&mut entity, &mut ctx());
        assert!((entity.velocity().x - 75.0).abs() < EPSILON);
    }

    #[test]
    fn test_closure_controller() {
        let mut calls = 0;
        let mut controller = |entity: &mut DynamicEntity, _dt: f32| {
            entity.add_velocity(Vec2::X);
            calls += 1;
            EventFlow::Continue
        };
        let mut entity = DynamicEntity::new(Vec2::ZERO, Vec2::new(1.0, 1.0));
        assert_eq!(controller.after_update(&mut entity, 0.016), EventFlow::Continue);
        controller.after_update(&mut entity, 0.016);
        assert_eq!(entity.velocity(), Vec2::new(2.0, 0.0));
        drop(controller);
        assert_eq!(calls, 2);
    }
}
