//! Avatar Arcade - avatar generator and falling-food mini-game
//!
//! Core modules:
//! - `identity`: Name hashing and rank/code derivation
//! - `sim`: Deterministic game simulation (entities, collisions, scheduler)
//! - `tuning`: Data-driven game balance
//! - `gallery`: Saved avatars in LocalStorage
//! - `settings`: Page preferences (theme)
//! - `platform`: Browser/native storage abstraction

pub mod gallery;
pub mod identity;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use gallery::{Gallery, GalleryEntry, GalleryError};
pub use identity::{Avatar, IdentityError, Rank, generate_avatar};
pub use settings::{Settings, ThemeMode};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Frame rate the per-tick speeds and chances are tuned for
    pub const REFERENCE_FPS: f32 = 60.0;

    // Play area, in layout units (CSS pixels)

    /// Food spawns at x in [0, FOOD_SPAWN_WIDTH)
    pub const FOOD_SPAWN_WIDTH: f32 = 860.0;
    pub const FOOD_SPAWN_Y: f32 = 80.0;
    pub const FOOD_SIZE: f32 = 40.0;
    /// Food below this y is a miss
    pub const FLOOR_Y: f32 = 670.0;
    pub const COMPACT_FLOOR_Y: f32 = 520.0;
    /// Viewports at or below this width use the compact layout
    pub const COMPACT_VIEWPORT_WIDTH: f64 = 600.0;

    /// Player (shrimp) defaults
    pub const PLAYER_START_X: f32 = 410.0;
    pub const PLAYER_MAX_X: f32 = 820.0;
    pub const PLAYER_STEP: f32 = 12.0;
    pub const PLAYER_WIDTH: f32 = 80.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;
    pub const PLAYER_TOP: f32 = 590.0;
    pub const COMPACT_PLAYER_TOP: f32 = 440.0;

    /// Bubble decoration
    pub const BUBBLE_CHANCE: f32 = 0.02;
    pub const BUBBLE_SPAWN_WIDTH: f32 = 880.0;
    pub const BUBBLE_MIN_SIZE: f32 = 15.0;
    pub const BUBBLE_SIZE_RANGE: f32 = 25.0;

    /// Session length in seconds
    pub const GAME_DURATION_SECS: u32 = 60;
}
