//! Scene objects: named, positioned entities with composable motions.
//!
//! An object's next position each tick is the sum of every registered
//! motion's incremental displacement (plus the built-in velocity
//! contribution), passed once through the object's remap function.

use glam::Vec2;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::collision::shape::{Shape, ShapeKind};
use crate::events::{EntityEvent, EntityEventKind, EventBus};
use crate::scene::Scene;

/// A named motion contribution: `(dt, current_position)` to an incremental
/// displacement for this tick. `None` contributes zero.
pub type MotionFn = Box<dyn FnMut(f32, Vec2) -> Option<Vec2>>;

/// Post-motion coordinate remap (wrap, clamp, teleport). Applied once per
/// tick to the summed result.
pub type MapFn = Box<dyn FnMut(Vec2) -> Vec2>;

/// Initial settings for a scene object registration.
///
/// Unset position axes are inherited from the object previously registered
/// under the same name, falling back to zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ObjectSettings {
    pub x: Option<f32>,
    pub y: Option<f32>,
    /// Built-in velocity, world units per second.
    pub dx: f32,
    pub dy: f32,
    /// Nominal size, used for default shape derivation.
    pub width: f32,
    pub height: f32,
}

/// Bounding shape assignment. Unset dimensions fall back to the object's
/// nominal size.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ShapeSettings {
    pub kind: ShapeKind,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// An addressable, positioned scene entity.
pub struct SceneObject {
    name: String,
    pos: Vec2,
    size: Vec2,
    vel: Vec2,
    motions: IndexMap<String, MotionFn>,
    map: MapFn,
    /// Disabled objects are skipped by the tick loop but still exist and
    /// keep their last position (so they can still be collided against).
    pub enabled: bool,
    /// Whether the collision pass considers this object at all.
    pub collidable: bool,
    pub(crate) events: EventBus<Scene, EntityEvent>,
    shape: Option<ShapeSettings>,
    /// Names of entities this object's shape currently overlaps; the
    /// enter/exit edge detector for collision events.
    pub(crate) colliding_with: FxHashSet<String>,
    pub(crate) alive: bool,
}

impl SceneObject {
    pub(crate) fn new(name: String, settings: ObjectSettings) -> Self {
        Self {
            name,
            pos: Vec2::new(settings.x.unwrap_or(0.0), settings.y.unwrap_or(0.0)),
            size: Vec2::new(settings.width, settings.height),
            vel: Vec2::new(settings.dx, settings.dy),
            motions: IndexMap::new(),
            map: Box::new(|pos| pos),
            enabled: true,
            collidable: true,
            events: EventBus::new(),
            shape: None,
            colliding_with: FxHashSet::default(),
            alive: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current committed position (corner-anchored).
    pub fn position(&self) -> Vec2 {
        self.pos
    }

    /// Teleport to an absolute position, bypassing motions and the remap.
    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    /// Move by an explicit delta, ignoring motions but honoring the remap.
    pub fn move_by(&mut self, delta: Vec2) {
        self.pos = (self.map)(self.pos + delta);
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Built-in velocity.
    pub fn velocity(&self) -> Vec2 {
        self.vel
    }

    pub fn set_velocity(&mut self, dx: f32, dy: f32) {
        self.vel = Vec2::new(dx, dy);
    }

    /// Register or replace a named motion.
    pub fn add_motion<F>(&mut self, name: impl Into<String>, motion: F) -> &mut Self
    where
        F: FnMut(f32, Vec2) -> Option<Vec2> + 'static,
    {
        self.motions.insert(name.into(), Box::new(motion));
        self
    }

    /// Remove a named motion; unknown names are a no-op.
    pub fn remove_motion(&mut self, name: &str) -> &mut Self {
        self.motions.shift_remove(name);
        self
    }

    pub fn has_motion(&self, name: &str) -> bool {
        self.motions.contains_key(name)
    }

    /// Replace the remap function.
    pub fn set_map<F>(&mut self, map: F) -> &mut Self
    where
        F: FnMut(Vec2) -> Vec2 + 'static,
    {
        self.map = Box::new(map);
        self
    }

    /// Assign a bounding shape.
    pub fn set_shape(&mut self, settings: ShapeSettings) -> &mut Self {
        self.shape = Some(settings);
        self
    }

    /// The object's shape at its current position, if one was assigned.
    pub fn shape(&self) -> Option<Shape> {
        self.shape.map(|settings| {
            let size = Vec2::new(
                settings.width.unwrap_or(self.size.x),
                settings.height.unwrap_or(self.size.y),
            );
            Shape::from_corner(settings.kind, self.pos, size)
        })
    }

    /// Register a handler on this object's event bus.
    pub fn on<F>(&mut self, kinds: &[EntityEventKind], handler: F) -> &mut Self
    where
        F: FnMut(&mut Scene, &EntityEvent) + 'static,
    {
        self.events.on(kinds, handler);
        self
    }

    /// One tick of motion: built-in velocity plus every registered motion,
    /// summed against the position read at tick start, then remapped.
    pub(crate) fn advance(&mut self, dt: f32) {
        let pos = self.pos;
        let mut delta = self.vel * dt;
        for motion in self.motions.values_mut() {
            if let Some(step) = motion(dt, pos) {
                delta += step;
            }
        }
        self.pos = (self.map)(pos + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(settings: ObjectSettings) -> SceneObject {
        SceneObject::new("obj".to_string(), settings)
    }

    #[test]
    fn test_velocity_motion_scales_by_dt() {
        let mut obj = object(ObjectSettings {
            dx: 50.0,
            dy: -20.0,
            ..Default::default()
        });
        obj.advance(0.5);
        assert_eq!(obj.position(), Vec2::new(25.0, -10.0));
    }

    #[test]
    fn test_motions_sum_with_velocity() {
        let mut obj = object(ObjectSettings {
            dx: 10.0,
            ..Default::default()
        });
        obj.add_motion("drift", |dt, _| Some(Vec2::new(0.0, 100.0 * dt)));
        obj.advance(1.0);
        assert_eq!(obj.position(), Vec2::new(10.0, 100.0));
    }

    #[test]
    fn test_none_contributes_zero() {
        let mut obj = object(ObjectSettings::default());
        obj.add_motion("idle", |_, _| None);
        obj.advance(1.0);
        assert_eq!(obj.position(), Vec2::ZERO);
    }

    #[test]
    fn test_motions_see_the_tick_start_position() {
        let mut obj = object(ObjectSettings {
            x: Some(5.0),
            dx: 100.0,
            ..Default::default()
        });
        obj.add_motion("probe", |_, pos| Some(Vec2::new(pos.x, 0.0)));
        obj.advance(1.0);
        // probe saw x = 5, not the velocity-advanced position
        assert_eq!(obj.position(), Vec2::new(110.0, 0.0));
    }

    #[test]
    fn test_re_registering_a_motion_replaces_it() {
        let mut obj = object(ObjectSettings::default());
        obj.add_motion("step", |_, _| Some(Vec2::new(1.0, 0.0)));
        obj.add_motion("step", |_, _| Some(Vec2::new(0.0, 1.0)));
        obj.advance(1.0);
        assert_eq!(obj.position(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_remove_motion_and_absent_removal() {
        let mut obj = object(ObjectSettings::default());
        obj.add_motion("step", |_, _| Some(Vec2::new(1.0, 0.0)));
        obj.remove_motion("step");
        obj.remove_motion("never-registered");
        obj.advance(1.0);
        assert_eq!(obj.position(), Vec2::ZERO);
    }

    #[test]
    fn test_remap_applies_after_summing() {
        let mut obj = object(ObjectSettings {
            x: Some(90.0),
            dx: 50.0,
            ..Default::default()
        });
        obj.set_map(|pos| Vec2::new(pos.x.clamp(0.0, 100.0), pos.y));
        obj.advance(1.0);
        assert_eq!(obj.position(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_move_by_honors_remap() {
        let mut obj = object(ObjectSettings::default());
        obj.set_map(|pos| Vec2::new(pos.x.rem_euclid(100.0), pos.y));
        obj.move_by(Vec2::new(250.0, 5.0));
        assert_eq!(obj.position(), Vec2::new(50.0, 5.0));
    }

    #[test]
    fn test_default_shape_derives_from_nominal_size() {
        let mut obj = object(ObjectSettings {
            x: Some(10.0),
            y: Some(20.0),
            width: 40.0,
            height: 20.0,
            ..Default::default()
        });
        assert!(obj.shape().is_none());
        obj.set_shape(ShapeSettings::default());
        match obj.shape().unwrap() {
            Shape::Rect { center, size } => {
                assert_eq!(center, Vec2::new(30.0, 30.0));
                assert_eq!(size, Vec2::new(40.0, 20.0));
            }
            _ => panic!("default shape should be a rectangle"),
        }
    }

    #[test]
    fn test_shape_size_override() {
        let mut obj = object(ObjectSettings {
            width: 40.0,
            height: 40.0,
            ..Default::default()
        });
        obj.set_shape(ShapeSettings {
            kind: ShapeKind::Rectangle,
            width: Some(36.0),
            height: Some(36.0),
        });
        match obj.shape().unwrap() {
            Shape::Rect { size, .. } => assert_eq!(size, Vec2::new(36.0, 36.0)),
            _ => panic!("expected a rectangle"),
        }
    }

    #[test]
    fn test_shape_tracks_position() {
        let mut obj = object(ObjectSettings {
            width: 20.0,
            height: 20.0,
            dx: 50.0,
            ..Default::default()
        });
        obj.set_shape(ShapeSettings {
            kind: ShapeKind::Circle,
            ..Default::default()
        });
        let before = obj.shape().unwrap().center();
        obj.advance(1.0);
        let after = obj.shape().unwrap().center();
        assert_eq!(after - before, Vec2::new(50.0, 0.0));
    }
}
