//! Deterministic simulation module
//!
//! All gameplay logic lives here. Nothing in this module touches the DOM:
//! - Seeded RNG only
//! - Stable entity ids, spawn-order iteration
//! - Rendering driven by `GameEvent`s and read-only state

pub mod food;
pub mod rect;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use food::{Food, FoodStore};
pub use rect::Rect;
pub use scheduler::{FrameOutcome, FrameToken, IntervalOutcome, Scheduler, StartPlan};
pub use state::{Difficulty, Facing, GameEvent, GameSession, Player, RunState, TimerUrgency};
pub use tick::{Command, apply_command, frame_tick, second_tick};
