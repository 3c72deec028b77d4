//! Engine and demo configuration.
//!
//! Settings types derive serde so hosts can load them from configuration
//! documents; the engine itself reads and writes no storage.

use serde::{Deserialize, Serialize};

use crate::consts;

/// Collision world configuration: quadtree bounds and subdivision limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CollisionSettings {
    /// World rectangle origin.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Maximum quadtree subdivision depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Occupants a node tolerates before splitting.
    #[serde(default = "default_max_children")]
    pub max_children: usize,
}

fn default_max_depth() -> u32 {
    consts::DEFAULT_MAX_DEPTH
}

fn default_max_children() -> usize {
    consts::DEFAULT_MAX_CHILDREN
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            max_depth: consts::DEFAULT_MAX_DEPTH,
            max_children: consts::DEFAULT_MAX_CHILDREN,
        }
    }
}

impl CollisionSettings {
    /// A world rectangle anchored at the origin.
    pub fn world(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

/// Configuration for the scripted demo (`beachbump` binary).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub beach_width: f32,
    pub beach_height: f32,
    /// Tick interval in seconds.
    pub game_delay: f32,
    /// Downhill scroll speed for dunes, px/s.
    pub beach_dy: f32,
    /// Scripted steering speed for the beachball, px/s.
    pub left_right_speed: f32,
    /// Sideways push applied per dune contact, px/s.
    pub dune_skid_speed: f32,
    pub max_dune_skid_speed: f32,
    pub total_dunes: usize,
    pub max_crabs: usize,
    /// Seconds between crab spawn attempts.
    pub crab_spawn_delay: f32,
    pub crab_min_dy: f32,
    pub crab_max_dy: f32,
    /// Seconds between scripted jumps.
    pub jump_delay: f32,
    /// Initial upward velocity of a jump, px/s.
    pub jump_velocity: f32,
    /// Downward acceleration ending a jump, px/s^2.
    pub jump_gravity: f32,
    /// RNG seed for dune placement and crab spawns.
    pub seed: u64,
    /// Simulated seconds before the demo stops itself.
    pub run_seconds: f32,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            beach_width: 800.0,
            beach_height: 600.0,
            game_delay: consts::DEFAULT_TICK,
            beach_dy: 60.0,
            left_right_speed: 120.0,
            dune_skid_speed: 80.0,
            max_dune_skid_speed: 240.0,
            total_dunes: 12,
            max_crabs: 5,
            crab_spawn_delay: 1.5,
            crab_min_dy: 40.0,
            crab_max_dy: 90.0,
            jump_delay: 3.0,
            jump_velocity: 160.0,
            jump_gravity: 480.0,
            seed: 42,
            run_seconds: 8.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_settings_defaults_fill_in() {
        let settings: CollisionSettings =
            serde_json::from_str(r#"{"x": 0.0, "y": 0.0, "width": 800.0, "height": 600.0}"#)
                .unwrap();
        assert_eq!(settings.max_depth, consts::DEFAULT_MAX_DEPTH);
        assert_eq!(settings.max_children, consts::DEFAULT_MAX_CHILDREN);
    }

    #[test]
    fn test_demo_settings_partial_document() {
        let settings: DemoSettings =
            serde_json::from_str(r#"{"total_dunes": 3, "seed": 7}"#).unwrap();
        assert_eq!(settings.total_dunes, 3);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.beach_width, 800.0);
    }
}
