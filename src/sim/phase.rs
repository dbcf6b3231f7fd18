//! Phase state machine
//!
//! `update_phase` is the single dispatch point. Each handler owns the
//! transitions out of its phase; the helpers below (`trigger_explosion`,
//! `begin_capture`, ...) are the event edges other systems fire.

use std::f32::consts::TAU;

use rand::Rng;

use super::maze::MazeGeometry;
use super::state::{
    Fragment, GameEvent, GameOver, GameOverStage, GameState, Intermission, IntermissionStage,
    Phase, Respawn,
};
use super::{attraction, collision, integrate, maze, merge, spawn, wormhole};
use crate::consts::*;
use crate::highscores::{HighScores, MAX_HIGH_SCORES, MAX_NAME_LEN, ScoreEntry, sanitize_name};
use crate::tuning::LEVEL_START_QUOTES;
use crate::{heading, round_to_ten};

/// Advance the current phase by `dt`
pub fn update_phase(state: &mut GameState, dt: f32) {
    match state.phase {
        Phase::Start => {}
        Phase::StartCountdown { .. } => update_start_countdown(state, dt),
        Phase::Playing => update_playing(state, dt),
        Phase::Captured { .. } => update_captured(state, dt),
        Phase::BetweenLevels(_) => update_intermission(state, dt),
        Phase::GameOver(_) => update_game_over(state, dt),
    }
}

/// Wipe the world: bodies, debris, patches, wormhole and pending timers
fn clear_world(state: &mut GameState) {
    state.bodies.clear();
    state.fragments.clear();
    state.ice_patches.clear();
    state.wormhole = None;
    state.effects = Default::default();
    state.flashes = Default::default();
    state.respawn = None;
    state.game_over_delay = None;
    state.spawn_timer = 0.0;
    state.health_timer = 0.0;
    state.invuln = 0.0;
}

/// Fresh run from level one, starting with the countdown
pub fn begin_countdown(state: &mut GameState) {
    clear_world(state);
    state.maze = None;
    state.level_index = 0;
    state.score = 0;
    state.warp = 0;
    state.energy = 1.0;
    state.lives = state.starting_lives;
    state.score_locked = false;
    state.hud.energy = 1.0;
    state.hud.score = 0.0;
    let center = state.arena * 0.5;
    state.ship.reset_at(center);
    state.phase = Phase::StartCountdown {
        timer: START_COUNTDOWN,
    };
    log::info!("Run starting (seed {})", state.seed);
}

/// Set up level `index` and start playing it
pub fn enter_level(state: &mut GameState, index: usize) {
    clear_world(state);
    state.level_index = index;
    state.maze = state
        .level()
        .maze
        .as_ref()
        .map(|def| MazeGeometry::build(def, state.arena));

    state.energy = 1.0;
    state.warp = 0;
    state.score_locked = false;
    state.health_interval = spawn::roll_health_interval(state);

    let spawn_at = state.spawn_point();
    state.ship.reset_at(spawn_at);

    if state.is_maze_level() {
        spawn::spawn_maze_items(state);
        wormhole::spawn_maze_wormhole(state);
    }

    state.phase = Phase::Playing;
    log::info!(
        "Level {} started (goal {}, maze: {})",
        index + 1,
        state.score_goal(),
        state.is_maze_level()
    );
    state.push_event(GameEvent::LevelStarted { level: index });
}

/// Destroy the ship; schedule a respawn or the game-over delay
pub fn trigger_explosion(state: &mut GameState) {
    if !state.ship.alive {
        return;
    }
    state.ship.alive = false;
    state.ship.end_thrust();

    let origin = state.ship.pos;
    let inherit = state.ship.vel * FRAGMENT_INHERIT;
    for k in 0..FRAGMENT_COUNT {
        let angle = TAU * k as f32 / FRAGMENT_COUNT as f32;
        let speed = FRAGMENT_MIN_SPEED + state.random_unit() * FRAGMENT_SPEED_SPREAD;
        state.fragments.push(Fragment {
            pos: origin,
            vel: heading(angle) * speed + inherit,
            angle,
            life: FRAGMENT_LIFE,
        });
    }
    state.effects = Default::default();

    if state.lives > 0 {
        state.lives -= 1;
        state.respawn = Some(Respawn::new());
    } else {
        state.game_over_delay = Some(GAME_OVER_DELAY);
    }
    log::info!("Ship destroyed ({} spare lives)", state.lives);
    state.push_event(GameEvent::ShipExploded {
        lives_left: state.lives,
    });
}

/// Enter the captured phase; no-op unless playing
pub fn begin_capture(state: &mut GameState) {
    if !state.phase.is_playing() {
        return;
    }
    state.ship.end_thrust();
    state.score_locked = true;
    state.phase = Phase::Captured {
        timer: CAPTURE_DURATION,
        warp_from: state.warp,
    };
    log::info!("Captured by wormhole on level {}", state.level_index + 1);
    state.push_event(GameEvent::Captured {
        level: state.level_index,
    });
}

/// Level bonus: energy in points plus a flat amount per spare life
pub fn level_bonus(energy: f32, lives: u8) -> u64 {
    round_to_ten(energy * ENERGY_BONUS_SCALE) + LIFE_BONUS * lives as u64
}

fn finish_level(state: &mut GameState) {
    let bonus = level_bonus(state.energy, state.lives);
    let from_level = state.level_index;
    state.warp = 0;
    state.wormhole = None;
    state.fragments.clear();
    state.phase = Phase::BetweenLevels(Intermission {
        stage: IntermissionStage::Banner,
        timer: 0.0,
        from_level,
        bonus,
        base_score: state.score,
        shown_bonus: bonus,
        quote: None,
    });
    log::info!("Level {} complete, bonus {}", from_level + 1, bonus);
    state.push_event(GameEvent::LevelComplete {
        level: from_level,
        bonus,
    });
}

fn enter_game_over(state: &mut GameState) {
    clear_world(state);
    state.ship.alive = false;
    let final_score = state.score;
    state.phase = Phase::GameOver(GameOver {
        stage: GameOverStage::AwaitingScores,
        timer: 0.0,
        final_score,
        rank: None,
    });
    log::info!("Game over with {} points", final_score);
    state.push_event(GameEvent::GameOver { score: final_score });
    state.push_event(GameEvent::FetchTopScores {
        limit: MAX_HIGH_SCORES,
    });
}

fn update_start_countdown(state: &mut GameState, dt: f32) {
    let Phase::StartCountdown { timer } = &mut state.phase else {
        return;
    };
    *timer -= dt;
    if *timer <= 0.0 {
        enter_level(state, 0);
    }
}

/// The in-level system order
fn update_playing(state: &mut GameState, dt: f32) {
    spawn::update_spawners(state, dt);
    attraction::apply_attraction(state, dt);
    integrate::integrate(state, dt);
    merge::merge_hazards(state);
    merge::cleanup_health(state);
    collision::resolve_ship_collisions(state);
    collision::sweep_offscreen(state);
    maze::update_maze(state, dt);
    wormhole::update_wormhole(state, dt);
    update_respawn(state, dt);
    update_game_over_delay(state, dt);
}

fn update_captured(state: &mut GameState, dt: f32) {
    if let Some(hole) = &state.wormhole {
        let pull = (hole.pos - state.ship.pos) * CAPTURE_DRIFT;
        state.ship.vel += pull * dt;
    }
    state.ship.angular_vel =
        (state.ship.angular_vel.abs() + CAPTURE_SPIN_ACCEL * dt).min(CAPTURE_MAX_SPIN);

    attraction::apply_attraction(state, dt);
    integrate::integrate(state, dt);
    merge::merge_hazards(state);
    merge::cleanup_health(state);
    collision::sweep_offscreen(state);
    maze::update_maze(state, dt);
    wormhole::update_wormhole(state, dt);

    let Phase::Captured { timer, warp_from } = &mut state.phase else {
        return;
    };
    *timer -= dt;
    let remaining = timer.max(0.0);
    state.warp = (*warp_from as f32 * remaining / CAPTURE_DURATION).floor() as u32;
    if remaining <= 0.0 {
        finish_level(state);
    }
}

enum StageStep {
    Stay,
    Advance,
    NextLevel(usize),
}

fn update_intermission(state: &mut GameState, dt: f32) {
    let Phase::BetweenLevels(inter) = &mut state.phase else {
        return;
    };
    inter.timer += dt;

    if inter.stage == IntermissionStage::Tally {
        // One progress value drives both counters so they land together
        let progress = (inter.timer / TALLY_TIME).clamp(0.0, 1.0);
        let credited = ((inter.bonus as f32 * progress).round() as u64).min(inter.bonus);
        inter.shown_bonus = inter.bonus - credited;
        state.hud.score = (inter.base_score + credited) as f64;
        if progress >= 1.0 {
            inter.shown_bonus = 0;
            state.score = inter.base_score + inter.bonus;
            state.hud.score = state.score as f64;
        }
    }

    let duration = inter.stage.duration();
    let step = if inter.timer < duration {
        StageStep::Stay
    } else {
        match inter.stage.next() {
            Some(next) => {
                inter.stage = next;
                inter.timer -= duration;
                if next == IntermissionStage::Quote {
                    inter.quote = Some(state.rng.random_range(0..LEVEL_START_QUOTES.len()));
                }
                StageStep::Advance
            }
            None => StageStep::NextLevel(inter.from_level + 1),
        }
    };

    match step {
        StageStep::Stay => {}
        StageStep::Advance => {
            if let Phase::BetweenLevels(inter) = &state.phase {
                log::debug!("Intermission stage {:?}", inter.stage);
            }
        }
        StageStep::NextLevel(level) => enter_level(state, level),
    }
}

fn spawn_point_clear(state: &GameState) -> bool {
    let spawn_at = state.spawn_point();
    state.bodies.iter().all(|body| {
        let clearance = SHIP_RADIUS + body.radius + SPAWN_CLEARANCE;
        body.pos.distance_squared(spawn_at) > clearance * clearance
    })
}

fn respawn_ship(state: &mut GameState) {
    let spawn_at = state.spawn_point();
    state.ship.reset_at(spawn_at);
    state.energy = 1.0;
    state.invuln = INVULN_TIME;
    state.respawn = None;
    log::info!("Ship respawned");
}

/// Cooldown, then periodic checks that the spawn point is clear
fn update_respawn(state: &mut GameState, dt: f32) {
    let Some(respawn) = state.respawn.as_mut() else {
        return;
    };
    if respawn.cooldown > 0.0 {
        respawn.cooldown -= dt;
        if respawn.cooldown > 0.0 {
            return;
        }
    }
    respawn.check_timer -= dt;
    if respawn.check_timer > 0.0 {
        return;
    }
    let checks = respawn.checks;

    if spawn_point_clear(state) || checks >= RESPAWN_MAX_CHECKS {
        respawn_ship(state);
    } else if let Some(respawn) = state.respawn.as_mut() {
        respawn.checks += 1;
        respawn.check_timer = RESPAWN_RECHECK;
        log::debug!("Spawn point blocked, recheck {}", respawn.checks);
    }
}

fn update_game_over_delay(state: &mut GameState, dt: f32) {
    let Some(delay) = state.game_over_delay.as_mut() else {
        return;
    };
    *delay -= dt;
    if *delay <= 0.0 {
        enter_game_over(state);
    }
}

fn update_game_over(state: &mut GameState, dt: f32) {
    let Phase::GameOver(over) = &mut state.phase else {
        return;
    };
    over.timer += dt;
    if over.stage == GameOverStage::AwaitingScores && over.timer >= LEADERBOARD_TIMEOUT {
        log::warn!("Leaderboard did not answer; using local scores");
        resolve_top_scores(state, None);
    }
}

/// Decide name entry vs summary once scores are known
///
/// `None` keeps the cached local table. Late answers are ignored.
pub fn resolve_top_scores(state: &mut GameState, fetched: Option<Vec<ScoreEntry>>) {
    let Phase::GameOver(over) = &mut state.phase else {
        return;
    };
    if over.stage != GameOverStage::AwaitingScores {
        return;
    }
    if let Some(entries) = fetched {
        state.leaderboard = HighScores::from_entries(entries);
    }
    over.rank = state.leaderboard.potential_rank(over.final_score);
    over.timer = 0.0;
    over.stage = match over.rank {
        Some(rank) => {
            log::info!("Score {} qualifies at rank {}", over.final_score, rank);
            GameOverStage::NameEntry {
                name: String::new(),
            }
        }
        None => GameOverStage::Summary,
    };
}

/// Append a typed character to the pending name
pub fn push_name_char(state: &mut GameState, c: char) {
    if let Phase::GameOver(GameOver {
        stage: GameOverStage::NameEntry { name },
        ..
    }) = &mut state.phase
    {
        if (c.is_alphanumeric() || c == ' ') && name.chars().count() < MAX_NAME_LEN {
            name.push(c);
        }
    }
}

pub fn pop_name_char(state: &mut GameState) {
    if let Phase::GameOver(GameOver {
        stage: GameOverStage::NameEntry { name },
        ..
    }) = &mut state.phase
    {
        name.pop();
    }
}

/// Record the entered name locally and ask the driver to submit it
pub fn submit_name(state: &mut GameState) {
    let Phase::GameOver(over) = &mut state.phase else {
        return;
    };
    let GameOverStage::NameEntry { name } = &over.stage else {
        return;
    };
    let name = sanitize_name(name);
    let score = over.final_score;
    over.rank = state.leaderboard.add_score(&name, score);
    over.stage = GameOverStage::Summary;
    log::info!("Submitting {} for {}", score, name);
    state.push_event(GameEvent::SubmitScore { name, score });
}
