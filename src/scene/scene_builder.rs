//! SceneBuilder - Fluent level construction
//!
//! Provides a fluent API for building platformer levels with physics.
//! Bodies that the world rejects are logged and skipped; building carries
//! on with the rest of the level.

use plat2d_math::Vec2;
use plat2d_physics::{
    Block, DynamicEntity, EntityController, EntityKey, EventBlock, EventSink, PhysicsConfig, PhysicsWorld,
    StaticBlock,
};

/// Thickness of floors added with [`SceneBuilder::add_floor`]
pub const DEFAULT_FLOOR_THICKNESS: f32 = 20.0;

/// Thickness of walls added with [`SceneBuilder::add_wall`]
pub const DEFAULT_WALL_THICKNESS: f32 = 20.0;

/// A built level
pub struct Scene {
    /// The populated physics world
    pub world: PhysicsWorld,
    /// The player entity, if one was added and accepted
    pub player: Option<EntityKey>,
    /// Number of bodies the world refused to register
    pub rejected: usize,
}

/// Builder for constructing platformer levels
///
/// # Example
/// ```ignore
/// let scene = SceneBuilder::new()
///     .with_physics(PhysicsConfig::new(Vec2::new(0.0, 980.0)))
///     .add_floor(Vec2::new(0.0, 400.0), 800.0)
///     .add_moving_platform(Vec2::new(100.0, 300.0), Vec2::new(400.0, 300.0), 3.0, Vec2::new(80.0, 10.0))
///     .add_player(Vec2::new(50.0, 350.0), Vec2::new(16.0, 32.0))
///     .build();
/// ```
pub struct SceneBuilder {
    world: PhysicsWorld,
    player: Option<EntityKey>,
    player_start: Option<Vec2>,
    rejected: usize,
}

impl SceneBuilder {
    /// Create a new scene builder with default physics
    pub fn new() -> Self {
        Self {
            world: PhysicsWorld::new(),
            player: None,
            player_start: None,
            rejected: 0,
        }
    }

    /// Replace the physics configuration
    ///
    /// Call this first: bodies already added are discarded.
    pub fn with_physics(mut self, config: PhysicsConfig) -> Self {
        if self.world.block_count() > 0 || self.world.entity_count() > 0 {
            log::warn!("Physics reconfigured after bodies were added; they are discarded");
        }
        self.world = PhysicsWorld::with_config(config);
        self.player = None;
        self.player_start = None;
        self.rejected = 0;
        self
    }

    /// Attach the receiver for events published by event blocks
    pub fn with_event_sink<S: EventSink + 'static>(mut self, sink: S) -> Self {
        self.world.set_event_sink(sink);
        self
    }

    /// Add a floor of the given width whose top-left corner is `position`
    pub fn add_floor(self, position: Vec2, width: f32) -> Self {
        self.add_block(StaticBlock::new(position, Vec2::new(width, DEFAULT_FLOOR_THICKNESS)))
    }

    /// Add a wall of the given height whose top-left corner is `position`
    pub fn add_wall(self, position: Vec2, height: f32) -> Self {
        self.add_block(StaticBlock::new(position, Vec2::new(DEFAULT_WALL_THICKNESS, height)))
    }

    /// Add any block
    pub fn add_block<B: Block + 'static>(mut self, block: B) -> Self {
        if self.world.add_block(block).is_err() {
            self.rejected += 1;
        }
        self
    }

    /// Add a platform moving back and forth between `start` and `end`
    ///
    /// Uses the world's platform friction.
    pub fn add_moving_platform(mut self, start: Vec2, end: Vec2, route_time: f32, size: Vec2) -> Self {
        let platform = self.world.new_kinematic_block(start, end, route_time, size);
        if self.world.add_kinematic_block(platform).is_err() {
            self.rejected += 1;
        }
        self
    }

    /// Add a static block that publishes `event` when collided with
    pub fn add_event_block(self, position: Vec2, size: Vec2, event: &str) -> Self {
        self.add_block(EventBlock::new(StaticBlock::new(position, size)).with_collision_event(event))
    }

    /// Add a moving platform that publishes `event` instead of carrying riders
    pub fn add_event_platform(mut self, start: Vec2, end: Vec2, route_time: f32, size: Vec2, event: &str) -> Self {
        let platform = self.world.new_kinematic_block(start, end, route_time, size);
        let block = EventBlock::new(platform).with_collision_event(event);
        if self.world.add_kinematic_block(block).is_err() {
            self.rejected += 1;
        }
        self
    }

    /// Add the player entity using the world's physics defaults
    pub fn add_player(mut self, position: Vec2, size: Vec2) -> Self {
        let entity = self.world.new_entity(position, size);
        self.player_start = Some(position);
        match self.world.add_entity(entity) {
            Ok(key) => self.player = Some(key),
            Err(_) => self.rejected += 1,
        }
        self
    }

    /// Add the player entity with a hook that runs after each collision pass
    pub fn add_controlled_player<C: EntityController + 'static>(
        mut self,
        position: Vec2,
        size: Vec2,
        controller: C,
    ) -> Self {
        let entity = self.world.new_entity(position, size);
        self.player_start = Some(position);
        match self.world.add_entity_with_controller(entity, controller) {
            Ok(key) => self.player = Some(key),
            Err(_) => self.rejected += 1,
        }
        self
    }

    /// Add a non-player entity
    pub fn add_entity(mut self, entity: DynamicEntity) -> Self {
        if self.world.add_entity(entity).is_err() {
            self.rejected += 1;
        }
        self
    }

    /// Get the player's starting position (if a player was added)
    pub fn player_start(&self) -> Option<Vec2> {
        self.player_start
    }

    /// Build the scene
    pub fn build(self) -> Scene {
        log::debug!(
            "Built scene with {} blocks, {} entities ({} rejected)",
            self.world.block_count(),
            self.world.entity_count(),
            self.rejected
        );
        Scene {
            world: self.world,
            player: self.player,
            rejected: self.rejected,
        }
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}
