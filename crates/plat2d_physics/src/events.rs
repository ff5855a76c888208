//! Collision notifications
//!
//! Hooks receive a [`HookContext`] that lets them publish [`CollisionEvent`]s
//! to the world's [`EventSink`] and request that the world be torn down.
//! The pub/sub bus itself lives outside this crate; the sink is the seam it
//! plugs into.

use crate::body::{Block, BlockKey, EntityKey, Kinematic};
use crate::entity::DynamicEntity;
use crate::shapes::Hitbox;
use plat2d_math::Vec2;

/// Default event name published when an entity collides with an event block
pub const DEFAULT_COLLISION_EVENT: &str = "collision";

/// Default event name published when an entity rests on an event block
pub const DEFAULT_TOUCHING_EVENT: &str = "touching";

/// What a sink wants the world to do after handling an event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventFlow {
    /// Keep simulating
    #[default]
    Continue,
    /// Destroy the world, aborting the rest of the current step
    EndWorld,
}

/// Named notification carrying the pair involved in a contact
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionEvent {
    /// Event name the bus dispatches on
    pub name: String,
    /// Entity that made contact
    pub entity: EntityKey,
    /// Block that was hit or touched
    pub block: BlockKey,
    /// Direction from entity toward block; `None` for touch events
    pub direction: Option<Vec2>,
}

/// Receiver for collision notifications
pub trait EventSink {
    /// Handle one event synchronously, from inside the collision pass
    fn publish(&mut self, event: &CollisionEvent) -> EventFlow;
}

impl<F> EventSink for F
where
    F: FnMut(&CollisionEvent) -> EventFlow,
{
    fn publish(&mut self, event: &CollisionEvent) -> EventFlow {
        self(event)
    }
}

/// Per-pair context handed to block hooks
pub struct HookContext<'a> {
    entity: EntityKey,
    block: BlockKey,
    sink: Option<&'a mut (dyn EventSink + 'static)>,
    end_requested: bool,
}

impl<'a> HookContext<'a> {
    /// Create a context for an entity/block pair publishing into `sink`
    pub fn new(entity: EntityKey, block: BlockKey, sink: Option<&'a mut (dyn EventSink + 'static)>) -> Self {
        Self {
            entity,
            block,
            sink,
            end_requested: false,
        }
    }

    /// Create a context with no sink attached; events are dropped
    pub fn detached(entity: EntityKey, block: BlockKey) -> HookContext<'static> {
        HookContext {
            entity,
            block,
            sink: None,
            end_requested: false,
        }
    }

    /// Key of the entity being processed
    pub fn entity_key(&self) -> EntityKey {
        self.entity
    }

    /// Key of the block being processed
    pub fn block_key(&self) -> BlockKey {
        self.block
    }

    /// Publish an event to the attached sink
    pub fn emit(&mut self, event: CollisionEvent) {
        match self.sink.as_deref_mut() {
            Some(sink) => {
                if sink.publish(&event) == EventFlow::EndWorld {
                    self.end_requested = true;
                }
            }
            None => log::trace!("No event sink attached; dropped event '{}'", event.name),
        }
    }

    /// Ask the world to tear down as soon as this hook returns
    pub fn end_world(&mut self) {
        self.end_requested = true;
    }

    /// Whether a hook or the sink asked for teardown
    pub fn end_requested(&self) -> bool {
        self.end_requested
    }
}

/// Wraps a block and replaces both hooks with event publication
///
/// Geometry and scripted motion come from the wrapped block, so an event
/// block can be static or a moving platform.
#[derive(Clone, Debug)]
pub struct EventBlock<B> {
    inner: B,
    collision_event: String,
    touching_event: String,
}

impl<B: Block> EventBlock<B> {
    /// Wrap a block using the default event names
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            collision_event: DEFAULT_COLLISION_EVENT.to_string(),
            touching_event: DEFAULT_TOUCHING_EVENT.to_string(),
        }
    }

    /// Set the event name published on collision
    pub fn with_collision_event(mut self, name: impl Into<String>) -> Self {
        self.collision_event = name.into();
        self
    }

    /// Set the event name published on ground-sensor contact
    pub fn with_touching_event(mut self, name: impl Into<String>) -> Self {
        self.touching_event = name.into();
        self
    }

    /// The wrapped block
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Event name published on collision
    pub fn collision_event(&self) -> &str {
        &self.collision_event
    }

    /// Event name published on ground-sensor contact
    pub fn touching_event(&self) -> &str {
        &self.touching_event
    }
}

impl<B: Block> Block for EventBlock<B> {
    fn hitbox(&self) -> &Hitbox {
        self.inner.hitbox()
    }

    fn position(&self) -> Vec2 {
        self.inner.position()
    }

    fn size(&self) -> Vec2 {
        self.inner.size()
    }

    fn velocity(&self) -> Vec2 {
        self.inner.velocity()
    }

    fn as_kinematic_mut(&mut self) -> Option<&mut dyn Kinematic> {
        self.inner.as_kinematic_mut()
    }

    fn on_collision(&self, _entity: &mut DynamicEntity, direction: Vec2, ctx: &mut HookContext<'_>) {
        let event = CollisionEvent {
            name: self.collision_event.clone(),
            entity: ctx.entity_key(),
            block: ctx.block_key(),
            direction: Some(direction),
        };
        ctx.emit(event);
    }

    fn touching(&self, _entity: &mut DynamicEntity, ctx: &mut HookContext<'_>) {
        let event = CollisionEvent {
            name: self.touching_event.clone(),
            entity: ctx.entity_key(),
            block: ctx.block_key(),
            direction: None,
        };
        ctx.emit(event);
    }
}
