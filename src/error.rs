//! Engine setup errors.
//!
//! Runtime soft failures (missing lookups, zero-listener emits, double
//! start/stop) degrade silently; only configuration bugs surface here.

use thiserror::Error;

/// Errors raised while configuring a [`Scene`](crate::scene::Scene).
#[derive(Debug, Error)]
pub enum SceneError {
    /// The scheduler was started with an interval that cannot drive a timer.
    #[error("tick interval must be finite and positive, got {0}")]
    InvalidInterval(f32),

    /// The collision world rectangle cannot hold a quadtree.
    #[error("collision world must have positive dimensions, got {width}x{height}")]
    InvalidWorld { width: f32, height: f32 },
}
