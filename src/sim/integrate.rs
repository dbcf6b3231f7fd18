//! Kinematics for the ship and bodies, plus ship status effects

use glam::Vec2;

use super::phase::trigger_explosion;
use super::state::{GameState, HitTint};
use crate::consts::*;
use crate::heading;

/// Start (or cancel, if already running) the reverse-spin effect
pub fn trigger_reverse_spin(state: &mut GameState) {
    if state.effects.reverse_spin_active() {
        state.effects.reverse_spin = 0.0;
        log::debug!("Reverse spin cancelled");
    } else {
        state.effects.reverse_spin = REVERSE_SPIN_DURATION;
        log::debug!("Reverse spin for {:.1}s", REVERSE_SPIN_DURATION);
    }
}

/// Drag multiplier for `dt` seconds of coasting
pub fn drag_factor(dt: f32) -> f32 {
    let frames = (dt * REFERENCE_FPS).clamp(0.0, MAX_DRAG_FRAMES);
    SHIP_DRAG.powf(frames)
}

/// Bounce the ship off its legal rectangle, scaling the reflected
/// component by `damp`; true on contact
pub fn bounce_off_bounds(state: &mut GameState, damp: f32) -> bool {
    let (min, max) = state.ship_bounds();
    let ship = &mut state.ship;
    let mut flip = Vec2::ONE;

    if ship.pos.x < min.x || ship.pos.x > max.x {
        ship.pos.x = ship.pos.x.clamp(min.x, max.x);
        flip.x = -damp;
    }
    if ship.pos.y < min.y || ship.pos.y > max.y {
        ship.pos.y = ship.pos.y.clamp(min.y, max.y);
        flip.y = -damp;
    }
    if flip == Vec2::ONE {
        return false;
    }

    ship.vel *= flip;
    if let Some(frozen) = state.effects.frozen_vel.as_mut() {
        *frozen *= flip;
    }
    true
}

fn integrate_ship(state: &mut GameState, dt: f32) {
    if !state.phase.is_captured() {
        state.ship.angular_vel = state.effects.angular_vel();
    }

    match state.effects.frozen_vel {
        Some(frozen) => {
            state.ship.vel = frozen;
            if state.effects.reverse_spin_active() {
                state.ship.turn(dt);
            }
        }
        None if state.ship.is_thrusting() => {
            state.ship.vel += heading(state.ship.thrust_dir) * SHIP_THRUST * dt;
        }
        None => {
            state.ship.vel *= drag_factor(dt);
            state.ship.turn(dt);
        }
    }

    state.ship.pos += state.ship.vel * dt;

    if !state.is_maze_level() && bounce_off_bounds(state, BOUNCE_DAMP) && state.phase.is_playing() {
        state.flashes.hit(HitTint::Wall, BUMP_FLASH);
        if state.drain_energy(BUMP_DAMAGE) {
            trigger_explosion(state);
            return;
        }
    }

    update_freeze(state);
}

/// Enter or leave the frozen state based on ice patch coverage
fn update_freeze(state: &mut GameState) {
    let inside = state
        .ice_patches
        .iter()
        .any(|patch| patch.freezes(state.ship.pos));

    match (inside, state.effects.frozen_vel.is_some()) {
        (true, false) => {
            let mut vel = state.ship.vel;
            if vel.length() < FROZEN_MIN_SPEED {
                vel = heading(state.ship.hull_angle()) * FROZEN_MIN_SPEED;
            }
            state.effects.frozen_vel = Some(vel);
            state.ship.vel = vel;
            log::debug!("Ship frozen at ({:.0}, {:.0})", vel.x, vel.y);
        }
        (false, true) => {
            state.effects.frozen_vel = None;
        }
        _ => {}
    }
}

/// Grow ice patches, drop their marker bodies, expire old ones
fn update_ice_patches(state: &mut GameState, dt: f32) {
    let mut finished = Vec::new();
    for patch in &mut state.ice_patches {
        patch.advance(dt);
        if !patch.is_expanding() {
            if let Some(id) = patch.source_body.take() {
                finished.push(id);
            }
        }
    }
    if !finished.is_empty() {
        state.bodies.retain(|b| !finished.contains(&b.id));
    }
    state.ice_patches.retain(|patch| !patch.is_expired());
}

/// Advance ship, bodies, ice patches and timed effects by `dt`
pub fn integrate(state: &mut GameState, dt: f32) {
    if state.ship.alive {
        integrate_ship(state, dt);
    }

    for body in &mut state.bodies {
        body.advance(dt);
    }

    update_ice_patches(state, dt);

    if state.effects.reverse_spin_active() {
        state.effects.reverse_spin = (state.effects.reverse_spin - dt).max(0.0);
    }
}

/// Advance explosion debris and drop spent pieces
pub fn update_fragments(state: &mut GameState, dt: f32) {
    for fragment in &mut state.fragments {
        fragment.pos += fragment.vel * dt;
        fragment.life -= dt;
    }
    state.fragments.retain(|f| f.life > 0.0);
}
