//! Typed synchronous publish/subscribe.
//!
//! Every owner in the engine (the scene, each entity, each trajectory) holds
//! its own [`EventBus`] over its own event enum. Delivery is synchronous and
//! in registration order; emitting with zero listeners is a no-op. Handlers
//! receive a mutable context (`&mut Scene` for scene and entity buses,
//! `&mut Trajectory` for trajectory buses) so they can re-enter the engine.

use std::cell::RefCell;
use std::rc::Rc;

/// An event with a cheap kind discriminant used for subscription matching.
pub trait Event {
    type Kind: Copy + PartialEq;

    fn kind(&self) -> Self::Kind;
}

/// A subscriber callback. Shared via `Rc` so one handler can be registered
/// under several kinds at once.
pub type Handler<Ctx, E> = Rc<RefCell<dyn FnMut(&mut Ctx, &E)>>;

/// Subscriber list for one owner.
///
/// `emit` walks a snapshot of the list, so handlers registered during an
/// emit are first invoked by the next emit, and clearing the bus inside a
/// handler does not disturb the in-flight dispatch.
pub struct EventBus<Ctx, E: Event> {
    subscribers: Vec<(E::Kind, Handler<Ctx, E>)>,
}

impl<Ctx, E: Event> Default for EventBus<Ctx, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx, E: Event> EventBus<Ctx, E> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Register `handler` under every kind in `kinds`.
    pub fn on<F>(&mut self, kinds: &[E::Kind], handler: F)
    where
        F: FnMut(&mut Ctx, &E) + 'static,
    {
        let handler: Handler<Ctx, E> = Rc::new(RefCell::new(handler));
        for kind in kinds {
            self.subscribers.push((*kind, handler.clone()));
        }
    }

    /// Snapshot of the handlers bound to `kind`, in registration order.
    pub(crate) fn handlers_for(&self, kind: E::Kind) -> Vec<Handler<Ctx, E>> {
        self.subscribers
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, handler)| handler.clone())
            .collect()
    }

    /// Synchronously invoke every handler bound to the event's kind.
    ///
    /// Owners that are themselves the context (the scene, a trajectory)
    /// dispatch through their own `emit` wrappers instead, which take the
    /// same snapshot before lending the owner out mutably.
    pub fn emit(&self, ctx: &mut Ctx, event: &E) {
        for handler in self.handlers_for(event.kind()) {
            (&mut *handler.borrow_mut())(ctx, event);
        }
    }

    /// Drop every subscriber.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Kinds of scene-wide events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneEventKind {
    Started,
    Stopped,
    Collision,
}

/// Events published on the scene-wide bus.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// The scheduler transitioned stopped -> running.
    Started,
    /// The scheduler transitioned running -> stopped.
    Stopped,
    /// Two collidable shapes began intersecting this tick. Fires once per
    /// pair per contact; the pair must separate before it can fire again.
    Collision { a: String, b: String },
}

impl Event for SceneEvent {
    type Kind = SceneEventKind;

    fn kind(&self) -> SceneEventKind {
        match self {
            SceneEvent::Started => SceneEventKind::Started,
            SceneEvent::Stopped => SceneEventKind::Stopped,
            SceneEvent::Collision { .. } => SceneEventKind::Collision,
        }
    }
}

/// Kinds of per-entity events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityEventKind {
    Enabled,
    Disabled,
    Removed,
}

/// Lifecycle events published on an entity's own bus.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    Enabled { name: String },
    Disabled { name: String },
    /// The entity is being removed; its bus is cleared right after dispatch.
    Removed { name: String },
}

impl EntityEvent {
    pub fn name(&self) -> &str {
        match self {
            EntityEvent::Enabled { name }
            | EntityEvent::Disabled { name }
            | EntityEvent::Removed { name } => name,
        }
    }
}

impl Event for EntityEvent {
    type Kind = EntityEventKind;

    fn kind(&self) -> EntityEventKind {
        match self {
            EntityEvent::Enabled { .. } => EntityEventKind::Enabled,
            EntityEvent::Disabled { .. } => EntityEventKind::Disabled,
            EntityEvent::Removed { .. } => EntityEventKind::Removed,
        }
    }
}

/// Kinds of trajectory events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrajectoryEventKind {
    MaxVelocity,
    MaxTime,
    ReturnedToStart,
}

/// Threshold events emitted by [`Trajectory::calc`](crate::trajectory::Trajectory::calc).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrajectoryEvent {
    /// The projected velocity would exceed the configured maximum.
    MaxVelocity,
    /// The projected time would exceed the configured maximum.
    MaxTime,
    /// The 1-D position crossed back through its starting coordinate.
    /// `position` is the exact return-time position, `dt` the distance from
    /// the current trajectory time to the return time.
    ReturnedToStart { position: f32, dt: f32 },
}

impl Event for TrajectoryEvent {
    type Kind = TrajectoryEventKind;

    fn kind(&self) -> TrajectoryEventKind {
        match self {
            TrajectoryEvent::MaxVelocity => TrajectoryEventKind::MaxVelocity,
            TrajectoryEvent::MaxTime => TrajectoryEventKind::MaxTime,
            TrajectoryEvent::ReturnedToStart { .. } => TrajectoryEventKind::ReturnedToStart,
        }
    }
}
