//! Game session state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::food::FoodStore;
use super::rect::Rect;
use crate::tuning::{PlayArea, Tuning};

/// Run state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Simulation advancing
    Running,
    /// Frozen; frame callbacks keep coming but change nothing
    Paused,
    /// Countdown hit zero
    Over,
}

/// Which way the player sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// The player's avatar at the bottom of the play area
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Left edge, clamped to [0, max_x]
    pub x: f32,
    pub facing: Facing,
}

impl Player {
    pub fn new(x: f32) -> Self {
        Self {
            x,
            facing: Facing::Right,
        }
    }

    pub fn move_left(&mut self, step: f32) {
        if self.x > 0.0 {
            self.x = (self.x - step).max(0.0);
            self.facing = Facing::Left;
        }
    }

    pub fn move_right(&mut self, step: f32, max_x: f32) {
        if self.x < max_x {
            self.x = (self.x + step).min(max_x);
            self.facing = Facing::Right;
        }
    }

    pub fn rect(&self, area: &PlayArea) -> Rect {
        Rect::from_min_size(
            Vec2::new(self.x, area.player_top),
            Vec2::new(area.player_width, area.player_height),
        )
    }
}

/// Scalars that grow with level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Multiplies every food's fall speed
    pub speed_multiplier: f32,
    /// Per-frame probability of spawning a food
    pub spawn_chance: f32,
    /// Base fall speed for newly spawned food
    pub fall_speed: f32,
}

impl Difficulty {
    pub fn initial(tuning: &Tuning) -> Self {
        Self {
            speed_multiplier: tuning.start_speed_multiplier,
            spawn_chance: tuning.start_spawn_chance,
            fall_speed: tuning.start_fall_speed,
        }
    }

    pub fn escalate(&mut self, tuning: &Tuning) {
        self.speed_multiplier += tuning.speed_multiplier_step;
        self.spawn_chance += tuning.spawn_chance_step;
        self.fall_speed += tuning.fall_speed_step;
    }
}

/// Something the render surface should react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    FoodSpawned { id: u32, pos: Vec2 },
    /// Caught by the player; play the burst effect at `pos`
    FoodCaught { id: u32, pos: Vec2, points: u64 },
    /// Fell past the floor
    FoodMissed { id: u32 },
    /// Decorative bubble rising from the bottom
    Bubble { x: f32, size: f32 },
    LevelUp { level: u32 },
    GameOver { score: u64, level: u32 },
}

/// Countdown colouring for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerUrgency {
    Calm,
    Warning,
    Critical,
}

/// One game from start to Over (or restart)
#[derive(Debug, Clone)]
pub struct GameSession {
    pub tuning: Tuning,
    pub score: u64,
    /// Starts at 1, never decreases
    pub level: u32,
    /// Seconds remaining on the countdown
    pub time_left: u32,
    pub difficulty: Difficulty,
    pub state: RunState,
    pub player: Player,
    pub foods: FoodStore,
    /// Frames simulated while running
    pub frame_ticks: u64,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            score: 0,
            level: 1,
            time_left: tuning.duration_secs,
            difficulty: Difficulty::initial(&tuning),
            state: RunState::Running,
            player: Player::new(tuning.player_start_x),
            foods: FoodStore::new(),
            frame_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            tuning,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn is_over(&self) -> bool {
        self.state == RunState::Over
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn player_rect(&self) -> Rect {
        self.player.rect(&self.tuning.area)
    }

    /// Score needed for the next level
    pub fn next_level_score(&self) -> u64 {
        self.tuning.level_threshold * self.level as u64
    }

    pub fn timer_urgency(&self) -> TimerUrgency {
        match self.time_left {
            0..=10 => TimerUrgency::Critical,
            11..=20 => TimerUrgency::Warning,
            _ => TimerUrgency::Calm,
        }
    }

    /// Speed multiplier as shown in the HUD, e.g. "1.2x"
    pub fn speed_label(&self) -> String {
        format!("{:.1}x", self.difficulty.speed_multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = GameSession::new(1, Tuning::default());
        assert_eq!(session.state, RunState::Running);
        assert_eq!(session.score, 0);
        assert_eq!(session.level, 1);
        assert_eq!(session.time_left, 60);
        assert_eq!(session.player.x, 410.0);
        assert!(session.foods.is_empty());
        assert_eq!(session.speed_label(), "1.0x");
        assert_eq!(session.next_level_score(), 200);
    }

    #[test]
    fn test_player_clamped_to_bounds() {
        let mut player = Player::new(5.0);
        player.move_left(12.0);
        assert_eq!(player.x, 0.0);
        assert_eq!(player.facing, Facing::Left);

        player.facing = Facing::Right;
        player.move_left(12.0);
        assert_eq!(player.x, 0.0);
        // No move, no turn
        assert_eq!(player.facing, Facing::Right);

        let mut player = Player::new(815.0);
        player.move_right(12.0, 820.0);
        assert_eq!(player.x, 820.0);
        player.move_right(12.0, 820.0);
        assert_eq!(player.x, 820.0);
    }

    #[test]
    fn test_timer_urgency_tiers() {
        let mut session = GameSession::new(1, Tuning::default());
        assert_eq!(session.timer_urgency(), TimerUrgency::Calm);
        session.time_left = 20;
        assert_eq!(session.timer_urgency(), TimerUrgency::Warning);
        session.time_left = 10;
        assert_eq!(session.timer_urgency(), TimerUrgency::Critical);
    }

    #[test]
    fn test_escalate_applies_fixed_steps() {
        let tuning = Tuning::default();
        let mut d = Difficulty::initial(&tuning);
        d.escalate(&tuning);
        assert!((d.speed_multiplier - 1.1).abs() < 1e-6);
        assert!((d.spawn_chance - 0.015).abs() < 1e-6);
        assert!((d.fall_speed - 1.3).abs() < 1e-6);
    }
}
