//! Nebula - a thrust-and-rotate gravity arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (gravity, collisions, maze, phases)
//! - `tuning`: Data-driven level table
//! - `settings`: Host/driver preferences
//! - `highscores`: Score record and leaderboard qualification
//! - `ui`: Button rectangles hit-tested by phase logic
//! - `platform`: Browser driver bindings

pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use highscores::{HighScores, ScoreEntry};
pub use settings::Settings;
pub use tuning::{LevelConfig, LevelTable};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::f32::consts::TAU;

    /// Nominal frame rate the per-frame drag is tuned against
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Largest dt a single update may advance (stall protection)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Ship
    pub const SHIP_RADIUS: f32 = 14.0;
    pub const SHIP_THRUST: f32 = 180.0;
    /// Velocity multiplier per 60 Hz frame while rotating
    pub const SHIP_DRAG: f32 = 0.98;
    pub const MAX_DRAG_FRAMES: f32 = 5.0;
    pub const ROT_PERIOD: f32 = 1.2;
    pub const ANGULAR_VEL: f32 = (TAU / ROT_PERIOD) * 0.95;
    /// Ship hitbox in local coordinates (nose along +x)
    pub const SHIP_TRI_LOCAL: [(f32, f32); 3] = [
        (SHIP_RADIUS, 0.0),
        (-SHIP_RADIUS * 0.7, SHIP_RADIUS * 0.6),
        (-SHIP_RADIUS * 0.7, -SHIP_RADIUS * 0.6),
    ];

    /// Gravity
    pub const ATTRACT_RADIUS: f32 = 220.0;
    pub const COIN_ATTRACT_SCALE: f32 = 0.75;
    pub const GRAVITY_K: f32 = 180.0;
    pub const SHIP_GRAVITY_FACTOR: f32 = 0.25;
    /// Squared distance below which no attraction is applied
    pub const MIN_ATTRACT_DIST_SQ: f32 = 1.0;

    /// Collision and damage
    pub const COIN_IMPULSE: f32 = 28.0;
    pub const ENEMY_DAMAGE: f32 = 0.14;
    pub const BUMP_DAMAGE: f32 = 0.02;
    pub const MAZE_WALL_DAMAGE: f32 = 0.05;
    pub const KNOCKBACK: f32 = -0.4;
    pub const BOUNCE_DAMP: f32 = 0.95;
    pub const MAZE_BOUNCE_DAMP: f32 = 0.6;
    pub const OFFSCREEN_MARGIN: f32 = 8.0;

    /// Scoring
    pub const COIN_WARP: u32 = 10;
    pub const COIN_SCORE: u64 = 100;
    pub const SLING_WARP: u32 = 25;
    pub const SLING_SCORE: u64 = 250;

    /// Layout
    pub const HUD_SAFE_BOTTOM: f32 = 64.0;
    /// Top band reserved above a maze, in pixels at level entry
    pub const MAZE_UI_HEIGHT: f32 = 50.0;
    pub const MAZE_INSET: f32 = 3.0;

    /// Entities
    pub const MAX_BODIES: usize = 40;
    pub const SPAWN_INTERVAL: f32 = 2.4;
    pub const SPAWN_TRIES: u32 = 30;
    pub const SPAWN_LOOKAHEAD: f32 = 0.25;
    pub const SPAWN_CLEARANCE: f32 = 20.0;
    pub const COIN_RADIUS: f32 = 8.0;
    pub const HAZARD_RADIUS: f32 = 11.0;
    pub const OBJECT_SCALE: f32 = 0.6;
    pub const BODY_SPAWN_DURATION: f32 = 0.8;

    /// Health pickups
    pub const HEALTH_RADIUS: f32 = 10.0;
    pub const HEALTH_SPEED: f32 = 40.0;
    pub const HEALTH_ATTRACT_MULT: f32 = 0.75;
    pub const HEALTH_SPAWN_DURATION: f32 = 0.5;
    pub const HEAL_MIN: f32 = 0.2;
    pub const HEAL_SPREAD: f32 = 0.1;
    pub const HEAL_FLASH_TOTAL: f32 = 0.25;

    /// Elite hazards
    pub const ELITE_RADIUS_SCALE: f32 = 1.15;
    pub const ELITE_VELOCITY_SCALE: f32 = 1.3;
    pub const ELITE_GRAV_MULT: f32 = 1.3;
    pub const ELITE_ATTRACT_MULT: f32 = 1.2;
    pub const ELITE_SPEED_MULT: f32 = 1.3;

    /// Ice
    pub const ICE_GROWTH: f32 = 8.0;
    pub const ICE_EXPANSION_TIME: f32 = 1.0;
    pub const ICE_LIFETIME: f32 = 15.0;
    pub const ICE_EDGE_SAMPLES: usize = 24;
    pub const ICE_EDGE_MIN: f32 = 0.85;
    pub const ICE_EDGE_SPREAD: f32 = 0.3;
    pub const FREEZE_TOLERANCE: f32 = 1.1;
    pub const FROZEN_MIN_SPEED: f32 = 30.0;
    pub const REVERSE_SPIN_DURATION: f32 = 4.0;

    /// Wormhole
    pub const WORMHOLE_RADIUS: f32 = 26.0;
    pub const MAZE_WORMHOLE_RADIUS: f32 = 16.0;
    pub const WORMHOLE_INSET: f32 = 60.0;
    pub const WORMHOLE_PULL: f32 = 40.0;
    pub const WORMHOLE_SPIN: f32 = 1.2;
    pub const CAPTURE_SHIP_FRACTION: f32 = 0.8;
    pub const CAPTURE_DURATION: f32 = 2.5;
    pub const CAPTURE_SPIN_ACCEL: f32 = 6.0;
    pub const CAPTURE_MAX_SPIN: f32 = (TAU / ROT_PERIOD) * 2.2;
    pub const CAPTURE_DRIFT: f32 = 3.0;

    /// Attractor walls
    pub const ATTRACTOR_FORCE: f32 = 260.0;

    /// Explosion and respawn
    pub const FRAGMENT_COUNT: usize = 8;
    pub const FRAGMENT_LIFE: f32 = 0.8;
    pub const FRAGMENT_MIN_SPEED: f32 = 160.0;
    pub const FRAGMENT_SPEED_SPREAD: f32 = 120.0;
    pub const FRAGMENT_INHERIT: f32 = 0.3;
    pub const RESPAWN_COOLDOWN: f32 = 0.8;
    pub const RESPAWN_RECHECK: f32 = 0.1;
    pub const RESPAWN_MAX_CHECKS: u32 = 30;
    pub const INVULN_TIME: f32 = 0.3;
    pub const GAME_OVER_DELAY: f32 = 1.5;
    pub const STARTING_LIVES: u8 = 3;

    /// Phase timers
    pub const START_COUNTDOWN: f32 = 3.0;
    pub const BANNER_TIME: f32 = 1.5;
    pub const TALLY_TIME: f32 = 1.5;
    pub const PAUSE_TIME: f32 = 1.0;
    pub const FADE_TIME: f32 = 0.8;
    pub const LEVEL_COUNTDOWN: f32 = 3.0;
    pub const QUOTE_TIME: f32 = 1.5;
    pub const LEADERBOARD_TIMEOUT: f32 = 3.0;

    /// Bonus
    pub const ENERGY_BONUS_SCALE: f32 = 1000.0;
    pub const LIFE_BONUS: u64 = 100;

    /// Flashes
    pub const HIT_FLASH: f32 = 0.1;
    pub const BUMP_FLASH: f32 = 0.05;
}

/// Normalize angle to (-π, π]
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Unit vector for a heading angle
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Closest point to `p` on segment `a`-`b`
#[inline]
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Round to the nearest multiple of ten
#[inline]
pub fn round_to_ten(value: f32) -> u64 {
    ((value / 10.0).round().max(0.0) as u64) * 10
}
