//! Per-frame simulation entry point

use super::integrate::update_fragments;
use super::phase::update_phase;
use super::state::{GameState, IntermissionStage, Phase};

/// HUD energy easing rate (per second)
const HUD_ENERGY_RATE: f32 = 8.0;
/// HUD score catch-up rate (per second) and minimum count speed
const HUD_SCORE_RATE: f64 = 6.0;
const HUD_SCORE_MIN_SPEED: f64 = 600.0;

/// Advance the simulation by one frame
///
/// `dt` is clamped to the configured maximum; non-positive or non-finite
/// values are ignored.
pub fn tick(state: &mut GameState, dt: f32) {
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }
    let dt = dt.min(state.max_dt);
    state.time += dt as f64;

    update_phase(state, dt);
    update_fragments(state, dt);
    decay_timers(state, dt);
    smooth_hud(state, dt);
}

fn decay_timers(state: &mut GameState, dt: f32) {
    state.invuln = (state.invuln - dt).max(0.0);
    state.flashes.decay(dt);
}

fn smooth_hud(state: &mut GameState, dt: f32) {
    let k = (dt * HUD_ENERGY_RATE).min(1.0);
    state.hud.energy = (state.hud.energy + (state.energy - state.hud.energy) * k).clamp(0.0, 1.0);

    let tallying = matches!(
        &state.phase,
        Phase::BetweenLevels(inter) if inter.stage == IntermissionStage::Tally
    );
    if tallying {
        return;
    }

    let target = state.score as f64;
    if state.hud.score >= target {
        state.hud.score = target;
    } else {
        let gap = target - state.hud.score;
        let step = (gap * HUD_SCORE_RATE * dt as f64).max(HUD_SCORE_MIN_SPEED * dt as f64);
        state.hud.score = (state.hud.score + step).min(target);
    }
}

impl GameState {
    /// Advance by `dt` seconds (see [`tick`])
    pub fn update(&mut self, dt: f32) {
        tick(self, dt);
    }
}
