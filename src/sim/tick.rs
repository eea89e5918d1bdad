//! Per-frame and per-second simulation steps
//!
//! Both steps are no-ops unless the session is running, which is how a
//! pause freezes everything while the host keeps calling in.

use rand::Rng;

use super::state::{GameEvent, GameSession, RunState};
use crate::consts::*;

/// Player input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    TogglePause,
}

/// Apply one input command
pub fn apply_command(session: &mut GameSession, command: Command) {
    match command {
        Command::TogglePause => {
            session.state = match session.state {
                RunState::Running => RunState::Paused,
                RunState::Paused => RunState::Running,
                RunState::Over => RunState::Over,
            };
            log::debug!("Pause toggled: {:?}", session.state);
        }
        Command::MoveLeft if session.is_running() => {
            session.player.move_left(session.tuning.player_step);
        }
        Command::MoveRight if session.is_running() => {
            let max_x = session.tuning.area.player_max_x;
            session.player.move_right(session.tuning.player_step, max_x);
        }
        _ => {}
    }
}

/// Advance one fixed step
///
/// Every step is the same size whatever the display rate: food falls by
/// `speed * speed_multiplier` and each spawn roll happens once.
pub fn frame_tick(session: &mut GameSession) {
    if !session.is_running() {
        return;
    }

    session.frame_ticks += 1;
    if session.frame_ticks == session.tuning.first_food_delay_frames as u64 {
        spawn_food(session);
    }

    session.foods.advance(session.difficulty.speed_multiplier);

    if resolve_collisions(session) {
        check_level_up(session);
    }

    roll_spawns(session);
}

/// Count down one second; returns true if this ended the session
pub fn second_tick(session: &mut GameSession) -> bool {
    if !session.is_running() {
        return false;
    }

    session.time_left = session.time_left.saturating_sub(1);
    if session.time_left == 0 {
        session.state = RunState::Over;
        session.events.push(GameEvent::GameOver {
            score: session.score,
            level: session.level,
        });
        log::info!(
            "Game over: score {} at level {}",
            session.score,
            session.level
        );
        return true;
    }
    false
}

/// Catch or drop food against the player; returns true if anything was caught
fn resolve_collisions(session: &mut GameSession) -> bool {
    let player = session.player_rect();
    let size = session.tuning.area.food_size;
    let floor_y = session.tuning.area.floor_y;
    let mut caught_any = false;

    let mut i = 0;
    while i < session.foods.len() {
        let (hit, missed) = {
            let food = &session.foods.all()[i];
            (food.rect(size).intersects(&player), food.pos.y > floor_y)
        };

        if hit {
            let food = session.foods.remove_at(i);
            let points = session.tuning.points_per_level * session.level as u64;
            session.score += points;
            caught_any = true;
            session.events.push(GameEvent::FoodCaught {
                id: food.id,
                pos: food.pos,
                points,
            });
        } else if missed {
            let food = session.foods.remove_at(i);
            session.events.push(GameEvent::FoodMissed { id: food.id });
        } else {
            i += 1;
        }
    }

    caught_any
}

/// Single threshold comparison; a big jump still only gains one level
fn check_level_up(session: &mut GameSession) {
    if session.score >= session.next_level_score() {
        session.level += 1;
        session.difficulty.escalate(&session.tuning);
        session.events.push(GameEvent::LevelUp {
            level: session.level,
        });
        log::info!(
            "Level {} (speed {})",
            session.level,
            session.speed_label()
        );
    }
}

fn roll_spawns(session: &mut GameSession) {
    if session.rng.random::<f32>() < session.difficulty.spawn_chance {
        spawn_food(session);
    }

    if session.rng.random::<f32>() < session.tuning.bubble_chance {
        let x = session.rng.random::<f32>() * BUBBLE_SPAWN_WIDTH;
        let size = BUBBLE_MIN_SIZE + session.rng.random::<f32>() * BUBBLE_SIZE_RANGE;
        session.events.push(GameEvent::Bubble { x, size });
    }
}

fn spawn_food(session: &mut GameSession) {
    let food = session.foods.spawn(
        &mut session.rng,
        &session.tuning.area,
        session.difficulty.fall_speed,
        session.tuning.fall_speed_spread,
    );
    let event = GameEvent::FoodSpawned {
        id: food.id,
        pos: food.pos,
    };
    log::trace!("Spawned {:?}", event);
    session.events.push(event);
}
