//! Bounding shapes and exact narrow-phase intersection tests.
//!
//! Entity positions are corner-anchored; shapes are center-anchored. The
//! corner -> center translation happens once, in [`Shape::from_corner`], so
//! every intersection test below works purely in center coordinates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The two supported bounding shape kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    #[default]
    Rectangle,
}

/// An axis-aligned bounding box, min/max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive overlap test (shared edges count).
    pub fn overlaps(self, other: Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// A bounding shape positioned in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    Rect { center: Vec2, size: Vec2 },
}

impl Shape {
    /// Build a shape from a corner-anchored position and an effective size.
    /// Circles take `max(width, height) / 2` as their radius.
    pub fn from_corner(kind: ShapeKind, corner: Vec2, size: Vec2) -> Self {
        let center = corner + size * 0.5;
        match kind {
            ShapeKind::Circle => Shape::Circle {
                center,
                radius: size.x.max(size.y) / 2.0,
            },
            ShapeKind::Rectangle => Shape::Rect { center, size },
        }
    }

    pub fn center(&self) -> Vec2 {
        match *self {
            Shape::Circle { center, .. } => center,
            Shape::Rect { center, .. } => center,
        }
    }

    /// Bounding box used by the broad phase.
    pub fn bounds(&self) -> Aabb {
        match *self {
            Shape::Circle { center, radius } => {
                Aabb::from_center_size(center, Vec2::splat(radius * 2.0))
            }
            Shape::Rect { center, size } => Aabb::from_center_size(center, size),
        }
    }

    /// Exact intersection test, dispatched over the four shape-pair
    /// combinations. Boundary behavior differs per pair on purpose:
    /// circle/circle counts touching circles, circle/rect does not, and
    /// rect/rect counts shared edges.
    pub fn intersects(&self, other: &Shape) -> bool {
        match (*self, *other) {
            (
                Shape::Circle {
                    center: a,
                    radius: ar,
                },
                Shape::Circle {
                    center: b,
                    radius: br,
                },
            ) => circle_circle(a, ar, b, br),
            (Shape::Circle { center, radius }, Shape::Rect { center: rect, size }) => {
                circle_rect(center, radius, rect, size)
            }
            (Shape::Rect { center: rect, size }, Shape::Circle { center, radius }) => {
                circle_rect(center, radius, rect, size)
            }
            (
                Shape::Rect {
                    center: a,
                    size: a_size,
                },
                Shape::Rect {
                    center: b,
                    size: b_size,
                },
            ) => rect_rect(a, a_size, b, b_size),
        }
    }
}

/// Whether two circles intersect (touching counts).
fn circle_circle(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let radii = a_radius + b_radius;
    a.distance_squared(b) <= radii * radii
}

/// Whether a circle intersects a rectangle, via the closest point on the
/// rectangle to the circle center (touching does not count).
fn circle_rect(circle: Vec2, radius: f32, rect: Vec2, size: Vec2) -> bool {
    let half = size * 0.5;
    let closest = circle.clamp(rect - half, rect + half);
    circle.distance_squared(closest) < radius * radius
}

/// Whether two rectangles intersect (shared edges count): separated when
/// some axis puts one strictly past the other.
fn rect_rect(a: Vec2, a_size: Vec2, b: Vec2, b_size: Vec2) -> bool {
    let ah = a_size * 0.5;
    let bh = b_size * 0.5;
    !(b.x - bh.x > a.x + ah.x
        || b.x + bh.x < a.x - ah.x
        || b.y - bh.y > a.y + ah.y
        || b.y + bh.y < a.y - ah.y)
}
