//! Collision detection: quadtree broad phase, exact narrow phase, and
//! enter/exit transition tracking.
//!
//! The system runs once per tick, after motion integration. It rebuilds the
//! spatial index from every live collidable shape, retrieves broad-phase
//! candidates per enabled subject, narrow-phase tests each candidate pair,
//! and flips the symmetric colliding-with state. A pair produces exactly one
//! `Collision` event per contact: the flag must clear (shapes observed
//! apart) before the pair can fire again.

pub mod quadtree;
pub mod shape;

pub use quadtree::QuadTree;
pub use shape::{Aabb, Shape, ShapeKind};

use crate::error::SceneError;
use crate::events::SceneEvent;
use crate::scene::Scene;
use crate::settings::CollisionSettings;

use glam::Vec2;

/// Per-tick broad + narrow phase over the scene's collidable objects.
pub struct CollisionSystem {
    tree: QuadTree<usize>,
}

impl CollisionSystem {
    pub(crate) fn new(settings: &CollisionSettings) -> Result<Self, SceneError> {
        if !settings.width.is_finite()
            || !settings.height.is_finite()
            || settings.width <= 0.0
            || settings.height <= 0.0
        {
            return Err(SceneError::InvalidWorld {
                width: settings.width,
                height: settings.height,
            });
        }
        let min = Vec2::new(settings.x, settings.y);
        let max = min + Vec2::new(settings.width, settings.height);
        Ok(Self {
            tree: QuadTree::new(Aabb::new(min, max), settings.max_depth, settings.max_children),
        })
    }

    /// Rebuild the index and run the pairwise scan. Collision events are
    /// returned rather than dispatched so the caller can deliver them after
    /// the scan, when handlers are free to mutate the scene.
    pub(crate) fn scan(&mut self, scene: &mut Scene) -> Vec<SceneEvent> {
        let colliders = scene.collision_snapshot();

        self.tree.clear();
        self.tree.insert(
            colliders
                .iter()
                .enumerate()
                .map(|(index, &(_, shape, _))| (shape.bounds(), index)),
        );

        let mut queued = Vec::new();
        for (index, &(key, shape, enabled)) in colliders.iter().enumerate() {
            if !enabled {
                continue;
            }
            for neighbour in self.tree.retrieve(shape.bounds()) {
                if neighbour == index {
                    continue;
                }
                let &(other_key, other_shape, _) = &colliders[neighbour];
                let hit = shape.intersects(&other_shape);
                let was_colliding = scene.colliding(key, other_key);
                if was_colliding && !hit {
                    scene.set_colliding(key, other_key, false);
                } else if !was_colliding && hit {
                    scene.set_colliding(key, other_key, true);
                    queued.push(SceneEvent::Collision {
                        a: scene.name_of(key),
                        b: scene.name_of(other_key),
                    });
                }
            }
        }
        queued
    }
}
