//! Physics world and simulation
//!
//! The world owns every block and entity and advances them with a fixed
//! pipeline: scripted blocks move first, then each entity integrates,
//! collides with every block in registration order, and runs its
//! controller.

use crate::body::{Block, BlockKey, EntityKey, KinematicBlock, DEFAULT_PLATFORM_FRICTION};
use crate::entity::{
    DynamicEntity, EntityController, DEFAULT_COLLISION_SLOP, DEFAULT_DRAG_FACTOR, DEFAULT_GRAVITY,
    DEFAULT_GROUND_SENSOR_DEPTH,
};
use crate::error::RegistrationError;
use crate::events::{EventFlow, EventSink, HookContext};
use plat2d_math::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Defaults applied to bodies built through the world
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity for new entities (y grows downward)
    pub gravity: Vec2,
    /// Horizontal drag factor for new entities
    pub drag_factor: f32,
    /// Clearance left after collision resolution
    pub collision_slop: f32,
    /// Depth of the ground sensor below an entity's hitbox
    pub ground_sensor_depth: f32,
    /// Friction for new moving platforms
    pub platform_friction: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            drag_factor: DEFAULT_DRAG_FACTOR,
            collision_slop: DEFAULT_COLLISION_SLOP,
            ground_sensor_depth: DEFAULT_GROUND_SENSOR_DEPTH,
            platform_friction: DEFAULT_PLATFORM_FRICTION,
        }
    }
}

impl PhysicsConfig {
    /// Create a config with the given gravity and default everything else
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..Default::default()
        }
    }

    /// Set the drag factor
    pub fn with_drag_factor(mut self, drag_factor: f32) -> Self {
        self.drag_factor = drag_factor;
        self
    }

    /// Set the collision slop
    pub fn with_collision_slop(mut self, slop: f32) -> Self {
        self.collision_slop = slop;
        self
    }

    /// Set the ground sensor depth
    pub fn with_ground_sensor_depth(mut self, depth: f32) -> Self {
        self.ground_sensor_depth = depth;
        self
    }

    /// Set the platform friction
    pub fn with_platform_friction(mut self, friction: f32) -> Self {
        self.platform_friction = friction;
        self
    }
}

/// An entity together with its optional post-update hook
struct EntitySlot {
    entity: DynamicEntity,
    controller: Option<Box<dyn EntityController>>,
}

/// The physics world containing all blocks and entities
///
/// Bodies are never removed one at a time, so slot map iteration follows
/// registration order and the simulation is deterministic for a given
/// sequence of registrations and step sizes.
pub struct PhysicsWorld {
    blocks: SlotMap<BlockKey, Box<dyn Block>>,
    entities: SlotMap<EntityKey, EntitySlot>,
    /// Blocks whose scripted motion runs at the start of each step
    updatables: Vec<BlockKey>,
    event_sink: Option<Box<dyn EventSink>>,
    ended: bool,
    config: PhysicsConfig,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        if config.ground_sensor_depth <= config.collision_slop {
            log::warn!(
                "Ground sensor depth {} does not exceed collision slop {}; resting entities will lose ground contact",
                config.ground_sensor_depth,
                config.collision_slop
            );
        }
        Self {
            blocks: SlotMap::with_key(),
            entities: SlotMap::with_key(),
            updatables: Vec::new(),
            event_sink: None,
            ended: false,
            config,
        }
    }

    /// Configuration used by the body factories
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Build an entity using this world's defaults (not registered)
    pub fn new_entity(&self, position: Vec2, size: Vec2) -> DynamicEntity {
        DynamicEntity::new(position, size)
            .with_gravity(self.config.gravity)
            .with_drag_factor(self.config.drag_factor)
            .with_collision_slop(self.config.collision_slop)
            .with_ground_sensor_depth(self.config.ground_sensor_depth)
    }

    /// Build a moving platform using this world's friction (not registered)
    pub fn new_kinematic_block(&self, start: Vec2, end: Vec2, route_time: f32, size: Vec2) -> KinematicBlock {
        KinematicBlock::new(start, end, route_time, size).with_friction(self.config.platform_friction)
    }

    /// Attach the receiver for events published by block hooks
    pub fn set_event_sink<S: EventSink + 'static>(&mut self, sink: S) {
        self.event_sink = Some(Box::new(sink));
    }

    /// Detach the event receiver; later events are dropped
    pub fn clear_event_sink(&mut self) {
        self.event_sink = None;
    }

    fn reject<T>(err: RegistrationError) -> Result<T, RegistrationError> {
        log::error!("{}", err);
        Err(err)
    }

    fn check_geometry(what: &str, position: Vec2, size: Vec2) -> Result<(), RegistrationError> {
        if !position.is_finite() {
            return Self::reject(RegistrationError::InvalidGeometry(format!(
                "{} position {:?} is not finite",
                what, position
            )));
        }
        if !size.is_finite() || size.x < 0.0 || size.y < 0.0 {
            return Self::reject(RegistrationError::InvalidGeometry(format!(
                "{} size {:?} must be finite and non-negative",
                what, size
            )));
        }
        Ok(())
    }

    /// Register a block and return its key
    pub fn add_block<B: Block + 'static>(&mut self, block: B) -> Result<BlockKey, RegistrationError> {
        self.add_boxed_block(Box::new(block))
    }

    /// Register an already boxed block and return its key
    pub fn add_boxed_block(&mut self, block: Box<dyn Block>) -> Result<BlockKey, RegistrationError> {
        if self.ended {
            return Self::reject(RegistrationError::WorldEnded);
        }
        Self::check_geometry("Block", block.position(), block.size())?;
        if !block.hitbox().is_finite() {
            return Self::reject(RegistrationError::InvalidGeometry("block hitbox is not finite".to_string()));
        }
        Ok(self.blocks.insert(block))
    }

    /// Schedule a registered block's scripted motion at the start of every step
    pub fn add_updatable(&mut self, key: BlockKey) -> Result<(), RegistrationError> {
        if self.ended {
            return Self::reject(RegistrationError::WorldEnded);
        }
        let Some(block) = self.blocks.get_mut(key) else {
            return Self::reject(RegistrationError::UnknownBlock(key));
        };
        if block.as_kinematic_mut().is_none() {
            return Self::reject(RegistrationError::NotKinematic(key));
        }
        if self.updatables.contains(&key) {
            return Self::reject(RegistrationError::AlreadyUpdatable(key));
        }
        self.updatables.push(key);
        Ok(())
    }

    /// Register a block and schedule its scripted motion
    ///
    /// A block without scripted motion is not registered at all.
    pub fn add_kinematic_block<B: Block + 'static>(&mut self, block: B) -> Result<BlockKey, RegistrationError> {
        let key = self.add_block(block)?;
        if let Err(err) = self.add_updatable(key) {
            self.blocks.remove(key);
            return Err(err);
        }
        Ok(key)
    }

    /// Register an entity and return its key
    pub fn add_entity(&mut self, entity: DynamicEntity) -> Result<EntityKey, RegistrationError> {
        self.insert_entity(EntitySlot {
            entity,
            controller: None,
        })
    }

    /// Register an entity with a hook that runs after its collision pass
    pub fn add_entity_with_controller<C: EntityController + 'static>(
        &mut self,
        entity: DynamicEntity,
        controller: C,
    ) -> Result<EntityKey, RegistrationError> {
        self.insert_entity(EntitySlot {
            entity,
            controller: Some(Box::new(controller)),
        })
    }

    fn insert_entity(&mut self, slot: EntitySlot) -> Result<EntityKey, RegistrationError> {
        if self.ended {
            return Self::reject(RegistrationError::WorldEnded);
        }
        Self::check_geometry("Entity", slot.entity.position(), slot.entity.size())?;
        if !slot.entity.velocity().is_finite() {
            return Self::reject(RegistrationError::InvalidGeometry(format!(
                "entity velocity {:?} is not finite",
                slot.entity.velocity()
            )));
        }
        Ok(self.entities.insert(slot))
    }

    /// Get a block by key
    pub fn block(&self, key: BlockKey) -> Option<&dyn Block> {
        self.blocks.get(key).map(|block| block.as_ref())
    }

    /// Get an entity by key
    pub fn entity(&self, key: EntityKey) -> Option<&DynamicEntity> {
        self.entities.get(key).map(|slot| &slot.entity)
    }

    /// Get an entity for control between steps
    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut DynamicEntity> {
        self.entities.get_mut(key).map(|slot| &mut slot.entity)
    }

    /// Iterate over all blocks in registration order
    pub fn blocks(&self) -> impl Iterator<Item = (BlockKey, &dyn Block)> + '_ {
        self.blocks.iter().map(|(key, block)| (key, block.as_ref()))
    }

    /// Iterate over all entities in registration order
    pub fn entities(&self) -> impl Iterator<Item = (EntityKey, &DynamicEntity)> + '_ {
        self.entities.iter().map(|(key, slot)| (key, &slot.entity))
    }

    /// Get the number of blocks in the world
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Get the number of entities in the world
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Get the number of blocks with scheduled motion
    pub fn updatable_count(&self) -> usize {
        self.updatables.len()
    }

    /// Whether a block's motion is scheduled
    pub fn is_updatable(&self, key: BlockKey) -> bool {
        self.updatables.contains(&key)
    }

    /// Whether the world has been destroyed
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Tear the world down; every registry is cleared and stepping stops
    pub fn destroy(&mut self) {
        if !self.ended {
            log::debug!(
                "Destroying physics world ({} blocks, {} entities)",
                self.blocks.len(),
                self.entities.len()
            );
        }
        self.ended = true;
        self.blocks.clear();
        self.entities.clear();
        self.updatables.clear();
    }

    /// Step the simulation forward by dt seconds
    ///
    /// This performs:
    /// 1. Scripted motion of every scheduled block
    /// 2. Per entity: integration, collision against each block, controller
    ///
    /// A hook that ends the world aborts the rest of the step.
    pub fn step(&mut self, dt: f32) {
        if self.ended {
            return;
        }
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("Ignoring physics step with invalid dt {}", dt);
            return;
        }

        if self.run_pipeline(dt) == EventFlow::EndWorld {
            self.destroy();
        }
    }

    fn run_pipeline(&mut self, dt: f32) -> EventFlow {
        // Phase 1: platforms move before anyone collides with them
        for &key in &self.updatables {
            if let Some(kinematic) = self.blocks.get_mut(key).and_then(|block| block.as_kinematic_mut()) {
                kinematic.update(dt);
            }
        }

        // Phase 2: entities
        let sink = &mut self.event_sink;
        for (entity_key, slot) in self.entities.iter_mut() {
            slot.entity.update(dt);

            for (block_key, block) in self.blocks.iter() {
                let mut ctx = HookContext::new(entity_key, block_key, sink.as_deref_mut());
                slot.entity.check_collision(block.as_ref(), &mut ctx);
                if ctx.end_requested() {
                    return EventFlow::EndWorld;
                }
            }

            if let Some(controller) = slot.controller.as_mut() {
                if controller.after_update(&mut slot.entity, dt) == EventFlow::EndWorld {
                    return EventFlow::EndWorld;
                }
            }
        }

        EventFlow::Continue
    }

    /// Test one registered entity against one registered block outside a step
    ///
    /// Returns `None` if either key is unknown.
    pub fn check_collision(&mut self, entity: EntityKey, block: BlockKey) -> Option<bool> {
        let block_ref = self.blocks.get(block)?;
        let slot = self.entities.get_mut(entity)?;
        let mut ctx = HookContext::new(entity, block, self.event_sink.as_deref_mut());
        let collided = slot.entity.check_collision(block_ref.as_ref(), &mut ctx);
        let end = ctx.end_requested();
        if end {
            self.destroy();
        }
        Some(collided)
    }
}
