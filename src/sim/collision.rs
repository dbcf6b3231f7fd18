//! Ship-vs-body collision detection and response
//!
//! Detection is two-phase: bounding circles first, then the body's circle
//! against the ship's rotated triangular hitbox.

use glam::Vec2;

use super::integrate::trigger_reverse_spin;
use super::phase::trigger_explosion;
use super::state::{BodyKind, GameState, HitTint, IcePatch};
use crate::consts::*;
use crate::{closest_point_on_segment, round_to_ten};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Collision point (if hit)
    pub point: Vec2,
    /// Surface normal at collision (pointing toward the moving circle)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Reflect velocity off a surface with given normal
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Ship hitbox in world coordinates
pub fn ship_triangle(pos: Vec2, angle: f32) -> [Vec2; 3] {
    let (sin, cos) = angle.sin_cos();
    SHIP_TRI_LOCAL.map(|(x, y)| pos + Vec2::new(x * cos - y * sin, x * sin + y * cos))
}

/// Point inside (or on) a triangle, either winding
pub fn point_in_triangle(p: Vec2, tri: &[Vec2; 3]) -> bool {
    let cross = |a: Vec2, b: Vec2| (b - a).perp_dot(p - a);
    let d0 = cross(tri[0], tri[1]);
    let d1 = cross(tri[1], tri[2]);
    let d2 = cross(tri[2], tri[0]);
    let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
    let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
    !(has_neg && has_pos)
}

/// Circle overlaps a triangle
pub fn circle_hits_triangle(center: Vec2, radius: f32, tri: &[Vec2; 3]) -> bool {
    if point_in_triangle(center, tri) {
        return true;
    }
    let r_sq = radius * radius;
    (0..3).any(|i| {
        let closest = closest_point_on_segment(center, tri[i], tri[(i + 1) % 3]);
        center.distance_squared(closest) <= r_sq
    })
}

/// Random rim profile for a new ice patch
fn ice_edge_profile(state: &mut GameState) -> Vec<f32> {
    (0..ICE_EDGE_SAMPLES)
        .map(|_| ICE_EDGE_MIN + state.random_unit() * ICE_EDGE_SPREAD)
        .collect()
}

/// Resolve ship contact with bodies for this tick
///
/// Iterates newest-first, collecting removals in a mask that is applied once
/// at the end. A hazard hit ends processing for the tick.
pub fn resolve_ship_collisions(state: &mut GameState) {
    if !state.phase.is_playing() || !state.ship.alive || state.invuln > 0.0 {
        return;
    }

    let tri = ship_triangle(state.ship.pos, state.ship.hull_angle());
    let mut removed = vec![false; state.bodies.len()];

    for i in (0..state.bodies.len()).rev() {
        let (id, kind, pos, radius) = {
            let body = &state.bodies[i];
            (body.id, body.kind, body.pos, body.radius)
        };

        let reach = SHIP_RADIUS + radius;
        if state.ship.pos.distance_squared(pos) > reach * reach {
            continue;
        }
        if !circle_hits_triangle(pos, radius, &tri) {
            continue;
        }

        match kind {
            BodyKind::Coin => {
                state.warp += COIN_WARP;
                state.score += COIN_SCORE;
                let push = (state.ship.pos - pos).normalize_or_zero();
                state.ship.vel += push * COIN_IMPULSE;
                removed[i] = true;
            }
            BodyKind::Health => {
                let heal = HEAL_MIN + state.random_unit() * HEAL_SPREAD;
                state.restore_energy(heal);
                state.score += round_to_ten(heal * ENERGY_BONUS_SCALE);
                state.flashes.heal = HEAL_FLASH_TOTAL;
                removed[i] = true;
            }
            BodyKind::Hazard | BodyKind::HazardElite => {
                let elite = kind == BodyKind::HazardElite;
                let (damage, tint) = if elite {
                    (ENEMY_DAMAGE * 2.0, HitTint::Elite)
                } else {
                    (ENEMY_DAMAGE, HitTint::Hazard)
                };
                state.flashes.hit(tint, HIT_FLASH);
                removed[i] = true;

                if state.drain_energy(damage) {
                    trigger_explosion(state);
                } else {
                    state.ship.vel *= KNOCKBACK;
                    if let Some(frozen) = state.effects.frozen_vel.as_mut() {
                        *frozen *= KNOCKBACK;
                    }
                    if elite && state.level().elite_reverse_spin {
                        trigger_reverse_spin(state);
                    }
                }
                break;
            }
            BodyKind::IceStar => {
                let profile = ice_edge_profile(state);
                let body = &mut state.bodies[i];
                body.kind = BodyKind::IcePatchExpanding;
                body.vel = Vec2::ZERO;
                body.grav_mult = 0.0;
                body.attract_mult = 0.0;
                state
                    .ice_patches
                    .push(IcePatch::new(pos, radius, id, profile));
                log::debug!("Ice star {} shattered at ({:.0}, {:.0})", id, pos.x, pos.y);
            }
            BodyKind::IcePatchExpanding => {}
        }
    }

    if removed.iter().any(|&r| r) {
        let mut flags = removed.into_iter();
        state.bodies.retain(|_| !flags.next().unwrap_or(false));
    }
}

/// Remove bodies that left the play area; escaped hazards score slingshots
pub fn sweep_offscreen(state: &mut GameState) {
    let min = Vec2::splat(-OFFSCREEN_MARGIN);
    let max = state.arena + Vec2::splat(OFFSCREEN_MARGIN);
    let scoring = !state.score_locked;
    let mut warp = 0;
    let mut score = 0;

    state.bodies.retain(|body| {
        let inside = body.pos.cmpge(min).all() && body.pos.cmple(max).all();
        if inside {
            return true;
        }
        if scoring {
            match body.kind {
                BodyKind::Hazard => {
                    warp += SLING_WARP;
                    score += SLING_SCORE;
                }
                BodyKind::HazardElite => {
                    warp += SLING_WARP * 2;
                    score += SLING_SCORE * 2;
                }
                _ => {}
            }
        }
        false
    });

    state.warp += warp;
    state.score += score;
}
