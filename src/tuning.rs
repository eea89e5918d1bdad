//! Data-driven game balance
//!
//! Every number the simulation scales with lives here so a session can be
//! started with a different layout (compact viewport) or for tests.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Geometry of the play area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub spawn_width: f32,
    pub spawn_y: f32,
    pub floor_y: f32,
    pub food_size: f32,
    pub player_top: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub player_max_x: f32,
}

impl Default for PlayArea {
    fn default() -> Self {
        Self {
            spawn_width: FOOD_SPAWN_WIDTH,
            spawn_y: FOOD_SPAWN_Y,
            floor_y: FLOOR_Y,
            food_size: FOOD_SIZE,
            player_top: PLAYER_TOP,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_max_x: PLAYER_MAX_X,
        }
    }
}

impl PlayArea {
    /// Narrow-screen layout: shorter play area, same width
    pub fn compact() -> Self {
        Self {
            floor_y: COMPACT_FLOOR_Y,
            player_top: COMPACT_PLAYER_TOP,
            ..Self::default()
        }
    }
}

/// Game balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub area: PlayArea,
    /// Countdown length
    pub duration_secs: u32,
    /// Starting difficulty
    pub start_speed_multiplier: f32,
    pub start_spawn_chance: f32,
    pub start_fall_speed: f32,
    /// Fall speed is sampled in [fall_speed, fall_speed + fall_speed_spread)
    pub fall_speed_spread: f32,
    /// Applied once per level-up
    pub speed_multiplier_step: f32,
    pub spawn_chance_step: f32,
    pub fall_speed_step: f32,
    /// Points per catch are `points_per_level * level`
    pub points_per_level: u64,
    /// Level-up when score >= `level_threshold * level`
    pub level_threshold: u64,
    /// Frames before the guaranteed first food
    pub first_food_delay_frames: u32,
    pub bubble_chance: f32,
    pub player_start_x: f32,
    pub player_step: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            area: PlayArea::default(),
            duration_secs: GAME_DURATION_SECS,
            start_speed_multiplier: 1.0,
            start_spawn_chance: 0.012,
            start_fall_speed: 1.0,
            fall_speed_spread: 2.0,
            speed_multiplier_step: 0.1,
            spawn_chance_step: 0.003,
            fall_speed_step: 0.3,
            points_per_level: 10,
            level_threshold: 200,
            first_food_delay_frames: (2.0 * REFERENCE_FPS) as u32,
            bubble_chance: BUBBLE_CHANCE,
            player_start_x: PLAYER_START_X,
            player_step: PLAYER_STEP,
        }
    }
}

impl Tuning {
    /// Tuning for a viewport of the given CSS width
    pub fn for_viewport(width: f64) -> Self {
        if width <= COMPACT_VIEWPORT_WIDTH {
            Self {
                area: PlayArea::compact(),
                ..Self::default()
            }
        } else {
            Self::default()
        }
    }
}
