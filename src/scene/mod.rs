//! The scene: entity table, tick pipeline, and event dispatch.
//!
//! A [`Scene`] owns everything that was process-global in earlier designs —
//! the object table, the pre/post hook lists, the scheduler, the collision
//! system — so multiple independent scenes can coexist (one per test, for
//! instance).
//!
//! Tick pipeline, in fixed order: pre-update hooks -> `advance(dt)` for
//! every enabled object -> post-update hooks -> collision pass. Hooks and
//! event handlers receive `&mut Scene` and may re-enter the engine; the
//! scene stays iterable under them by snapshotting hook/handler lists before
//! dispatch, queueing collision events until the scan finishes, and
//! deferring arena compaction of removed objects to end-of-tick.

pub mod object;
pub mod scheduler;

use std::thread;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::collision::CollisionSystem;
use crate::collision::shape::Shape;
use crate::error::SceneError;
use crate::events::{EntityEvent, Event, EventBus, SceneEvent, SceneEventKind};
use crate::settings::CollisionSettings;

use object::{ObjectSettings, SceneObject};
use scheduler::Scheduler;

new_key_type! {
    /// Arena key for a scene object slot.
    pub struct EntityKey;
}

/// A pre/post tick callback.
pub type HookFn = Box<dyn FnMut(&mut Scene, f32)>;

/// The scene context: object arena + name index, hooks, scene-wide event
/// bus, scheduler, and (once loaded) the collision system.
pub struct Scene {
    objects: SlotMap<EntityKey, SceneObject>,
    names: FxHashMap<String, EntityKey>,
    events: EventBus<Scene, SceneEvent>,
    before: Vec<HookFn>,
    after: Vec<HookFn>,
    scheduler: Scheduler,
    collisions: Option<CollisionSystem>,
    dead: Vec<EntityKey>,
    tick_depth: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
            names: FxHashMap::default(),
            events: EventBus::new(),
            before: Vec::new(),
            after: Vec::new(),
            scheduler: Scheduler::new(),
            collisions: None,
            dead: Vec::new(),
            tick_depth: 0,
        }
    }

    /// Register a scene object. Registering a name that already exists
    /// replaces the object; position axes the settings leave unset carry
    /// over from the replaced object.
    pub fn add(&mut self, name: impl Into<String>, settings: ObjectSettings) -> &mut SceneObject {
        let name = name.into();
        let mut settings = settings;
        if let Some(&old_key) = self.names.get(&name) {
            log::warn!("scene object {name:?} re-registered; replacing");
            let old = &mut self.objects[old_key];
            let prior = old.position();
            if settings.x.is_none() {
                settings.x = Some(prior.x);
            }
            if settings.y.is_none() {
                settings.y = Some(prior.y);
            }
            old.alive = false;
            old.events.clear();
            self.dead.push(old_key);
            if self.tick_depth == 0 {
                self.compact();
            }
        }
        let key = self.objects.insert(SceneObject::new(name.clone(), settings));
        self.names.insert(name, key);
        &mut self.objects[key]
    }

    /// Look up an object by name.
    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.names.get(name).and_then(|&key| self.objects.get(key))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.names
            .get(name)
            .and_then(|&key| self.objects.get_mut(key))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Names of all live objects.
    pub fn names(&self) -> Vec<String> {
        self.objects
            .values()
            .filter(|object| object.alive)
            .map(|object| object.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Remove an object by name: its `Removed` event fires, its bus is
    /// cleared, and lookups fail immediately. The arena slot itself is
    /// reclaimed at end-of-tick so in-flight iteration stays stable.
    pub fn remove(&mut self, name: &str) {
        let Some(key) = self.names.remove(name) else {
            return;
        };
        self.objects[key].alive = false;
        let event = EntityEvent::Removed {
            name: name.to_string(),
        };
        let handlers = self.objects[key].events.handlers_for(event.kind());
        for handler in handlers {
            (&mut *handler.borrow_mut())(self, &event);
        }
        if let Some(object) = self.objects.get_mut(key) {
            object.events.clear();
        }
        self.dead.push(key);
        if self.tick_depth == 0 {
            self.compact();
        }
    }

    /// Enable or disable an object, notifying its bus on actual changes.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) {
        let Some(&key) = self.names.get(name) else {
            return;
        };
        let object = &mut self.objects[key];
        if object.enabled == enabled {
            return;
        }
        object.enabled = enabled;
        let event = if enabled {
            EntityEvent::Enabled {
                name: name.to_string(),
            }
        } else {
            EntityEvent::Disabled {
                name: name.to_string(),
            }
        };
        self.emit_entity(name, &event);
    }

    /// Register a handler on the scene-wide bus.
    pub fn on<F>(&mut self, kinds: &[SceneEventKind], handler: F)
    where
        F: FnMut(&mut Scene, &SceneEvent) + 'static,
    {
        self.events.on(kinds, handler);
    }

    /// Synchronously dispatch a scene event to a snapshot of the current
    /// subscribers.
    pub fn emit(&mut self, event: &SceneEvent) {
        let handlers = self.events.handlers_for(event.kind());
        for handler in handlers {
            (&mut *handler.borrow_mut())(self, event);
        }
    }

    /// Dispatch an event on one object's bus.
    pub fn emit_entity(&mut self, name: &str, event: &EntityEvent) {
        let Some(&key) = self.names.get(name) else {
            return;
        };
        let handlers = self.objects[key].events.handlers_for(event.kind());
        for handler in handlers {
            (&mut *handler.borrow_mut())(self, event);
        }
    }

    /// Register a hook to run before objects advance each tick.
    pub fn schedule_before<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Scene, f32) + 'static,
    {
        self.before.push(Box::new(hook));
    }

    /// Register a hook to run after objects advance each tick.
    pub fn schedule_after<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Scene, f32) + 'static,
    {
        self.after.push(Box::new(hook));
    }

    /// Configure the collision system over the given world rectangle.
    pub fn load_collisions(&mut self, settings: CollisionSettings) -> Result<(), SceneError> {
        self.collisions = Some(CollisionSystem::new(&settings)?);
        Ok(())
    }

    /// Start the fixed-interval scheduler. Returns `Ok(false)` when already
    /// running (double start never creates a second tick source).
    pub fn start(&mut self, interval: f32) -> Result<bool, SceneError> {
        let started = self.scheduler.start(interval)?;
        if started {
            log::info!("scene started, {interval}s per tick");
            self.emit(&SceneEvent::Started);
        }
        Ok(started)
    }

    /// Stop the scheduler; a no-op when already stopped.
    pub fn stop(&mut self) {
        if self.scheduler.stop() {
            log::info!("scene stopped");
            self.emit(&SceneEvent::Stopped);
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Drive the scheduler on the calling thread until something calls
    /// [`stop`](Self::stop). Every tick gets the configured interval as its
    /// `dt` regardless of timer jitter.
    pub fn run(&mut self) {
        while self.scheduler.is_running() {
            let tick_started = Instant::now();
            let dt = self.scheduler.interval();
            self.tick(dt);
            if let Some(remaining) =
                Duration::from_secs_f32(dt).checked_sub(tick_started.elapsed())
            {
                thread::sleep(remaining);
            }
        }
    }

    /// One tick of the pipeline: pre-hooks, advance every enabled object,
    /// post-hooks, collision pass. Hosts with their own frame loop (and
    /// tests) call this directly.
    pub fn tick(&mut self, dt: f32) {
        self.tick_depth += 1;

        self.run_hooks(false, dt);

        let keys: Vec<EntityKey> = self.objects.keys().collect();
        for key in keys {
            if let Some(object) = self.objects.get_mut(key) {
                if object.alive && object.enabled {
                    object.advance(dt);
                }
            }
        }

        self.run_hooks(true, dt);

        if let Some(mut system) = self.collisions.take() {
            let queued = system.scan(self);
            if self.collisions.is_none() {
                self.collisions = Some(system);
            }
            for event in &queued {
                self.emit(event);
            }
        }

        self.tick_depth -= 1;
        if self.tick_depth == 0 {
            self.compact();
        }
    }

    fn run_hooks(&mut self, after: bool, dt: f32) {
        let slot = if after { &mut self.after } else { &mut self.before };
        let mut hooks = std::mem::take(slot);
        for hook in hooks.iter_mut() {
            hook(self, dt);
        }
        // hooks registered while running land behind the existing ones
        let slot = if after { &mut self.after } else { &mut self.before };
        hooks.append(slot);
        *slot = hooks;
    }

    fn compact(&mut self) {
        for key in self.dead.drain(..) {
            self.objects.remove(key);
        }
    }

    pub(crate) fn collision_snapshot(&self) -> Vec<(EntityKey, Shape, bool)> {
        self.objects
            .iter()
            .filter(|(_, object)| object.alive && object.collidable)
            .filter_map(|(key, object)| object.shape().map(|shape| (key, shape, object.enabled)))
            .collect()
    }

    pub(crate) fn colliding(&self, a: EntityKey, b: EntityKey) -> bool {
        self.objects[a]
            .colliding_with
            .contains(self.objects[b].name())
    }

    pub(crate) fn set_colliding(&mut self, a: EntityKey, b: EntityKey, colliding: bool) {
        let name_a = self.objects[a].name().to_string();
        let name_b = self.objects[b].name().to_string();
        if colliding {
            self.objects[a].colliding_with.insert(name_b);
            self.objects[b].colliding_with.insert(name_a);
        } else {
            self.objects[a].colliding_with.remove(&name_b);
            self.objects[b].colliding_with.remove(&name_a);
        }
    }

    pub(crate) fn name_of(&self, key: EntityKey) -> String {
        self.objects[key].name().to_string()
    }
}
