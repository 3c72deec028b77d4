//! BeachBump - a SkiFree-style beach arcade game
//!
//! The library is the scene engine that drives the game:
//! - `scene`: named objects, motion composition, fixed-interval scheduler
//! - `collision`: quadtree broad phase + exact narrow-phase shape tests
//! - `trajectory`: closed-form 1-D ballistic arcs (jumps)
//! - `events`: typed synchronous publish/subscribe
//! - `settings`: serde-backed configuration
//!
//! The engine is headless and single-threaded: all work happens inside
//! [`Scene::tick`], and game logic reacts through event handlers and hooks
//! instead of polling. The `beachbump` binary is a scripted rendition of
//! the game loop on top of it.

pub mod collision;
pub mod error;
pub mod events;
pub mod scene;
pub mod settings;
pub mod trajectory;

pub use collision::{Aabb, QuadTree, Shape, ShapeKind};
pub use error::SceneError;
pub use events::{
    EntityEvent, EntityEventKind, Event, EventBus, SceneEvent, SceneEventKind, TrajectoryEvent,
    TrajectoryEventKind,
};
pub use scene::object::{ObjectSettings, SceneObject, ShapeSettings};
pub use scene::{EntityKey, Scene};
pub use settings::CollisionSettings;
pub use trajectory::{Sample, Trajectory, TrajectorySettings};

/// Engine configuration constants
pub mod consts {
    /// Default fixed tick interval (a 30 Hz game loop).
    pub const DEFAULT_TICK: f32 = 1.0 / 30.0;

    /// Quadtree subdivision defaults.
    pub const DEFAULT_MAX_DEPTH: u32 = 4;
    pub const DEFAULT_MAX_CHILDREN: usize = 4;
}
