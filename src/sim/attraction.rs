//! Mutual ship/body gravity

use glam::Vec2;

use super::state::{BodyKind, GameState};
use crate::consts::*;

/// Base attraction reach for a body kind
pub fn attract_radius(kind: BodyKind) -> f32 {
    match kind {
        BodyKind::Coin => ATTRACT_RADIUS * COIN_ATTRACT_SCALE,
        _ => ATTRACT_RADIUS,
    }
}

/// Pull bodies toward the ship and the ship (more weakly) toward them
///
/// Strength falls off linearly from full at the ship to zero at each
/// body's reach. On maze levels a
/// health pickup is only attracted while the ship shares its cell.
pub fn apply_attraction(state: &mut GameState, dt: f32) {
    if !state.ship.alive {
        return;
    }
    let ship_pos = state.ship.pos;
    let arena = state.arena;
    let ship_cell = state
        .maze
        .as_ref()
        .and_then(|maze| maze.cell_at(ship_pos, arena));

    let mut ship_accel = Vec2::ZERO;
    for body in &mut state.bodies {
        let reach = attract_radius(body.kind) * body.attract_mult;
        let delta = ship_pos - body.pos;
        let dist_sq = delta.length_squared();
        if dist_sq <= MIN_ATTRACT_DIST_SQ || dist_sq > reach * reach {
            continue;
        }

        if body.kind == BodyKind::Health {
            if let Some(maze) = &state.maze {
                let same_cell = ship_cell.is_some() && maze.cell_at(body.pos, arena) == ship_cell;
                if !same_cell {
                    continue;
                }
            }
        }

        let dist = dist_sq.sqrt();
        let dir = delta / dist;
        let falloff = 1.0 - dist / reach;
        let strength = GRAVITY_K * falloff * body.grav_mult;
        body.vel += dir * strength * body.speed_mult * dt;
        ship_accel -= dir * strength * SHIP_GRAVITY_FACTOR * body.grav_mult;
    }
    state.ship.vel += ship_accel * dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::maze::MazeGeometry;
    use crate::sim::state::Body;
    use crate::tuning::{Cell, LevelTable, default_maze};

    fn state() -> GameState {
        GameState::new(1, LevelTable::default(), 800.0, 600.0)
    }

    fn add(state: &mut GameState, kind: BodyKind, pos: Vec2) {
        let id = state.next_entity_id();
        state.bodies.push(Body::new(id, kind, pos, 6.0));
    }

    #[test]
    fn test_mutual_pull_is_asymmetric() {
        let mut state = state();
        state.ship.vel = Vec2::ZERO;
        let ship = state.ship.pos;
        add(&mut state, BodyKind::Hazard, ship + Vec2::new(100.0, 0.0));

        apply_attraction(&mut state, 0.1);

        let body_dv = state.bodies[0].vel;
        let ship_dv = state.ship.vel;
        assert!(body_dv.x < 0.0);
        assert!(ship_dv.x > 0.0);
        assert!((ship_dv.length() - body_dv.length() * SHIP_GRAVITY_FACTOR).abs() < 1e-4);
        let falloff = 1.0 - 100.0 / ATTRACT_RADIUS;
        assert!((body_dv.length() - GRAVITY_K * falloff * 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_pull_fades_linearly_to_reach() {
        let mut state = state();
        state.ship.vel = Vec2::ZERO;
        let ship = state.ship.pos;
        add(&mut state, BodyKind::Hazard, ship + Vec2::new(100.0, 0.0));
        add(&mut state, BodyKind::Hazard, ship - Vec2::new(ATTRACT_RADIUS - 1.0, 0.0));

        apply_attraction(&mut state, 1.0);

        let near = state.bodies[0].vel.length();
        let far = state.bodies[1].vel.length();
        assert!((near - GRAVITY_K * (1.0 - 100.0 / ATTRACT_RADIUS)).abs() < 1e-2);
        assert!(far > 0.0 && far < GRAVITY_K / ATTRACT_RADIUS * 1.5);
    }

    #[test]
    fn test_coin_reach_is_shorter() {
        let mut state = state();
        let ship = state.ship.pos;
        add(&mut state, BodyKind::Coin, ship + Vec2::new(200.0, 0.0));
        add(&mut state, BodyKind::Hazard, ship - Vec2::new(200.0, 0.0));
        apply_attraction(&mut state, 0.1);
        assert_eq!(state.bodies[0].vel, Vec2::ZERO);
        assert_ne!(state.bodies[1].vel, Vec2::ZERO);
    }

    #[test]
    fn test_coincident_body_feels_nothing() {
        let mut state = state();
        let ship = state.ship.pos;
        add(&mut state, BodyKind::Hazard, ship + Vec2::new(0.5, 0.0));
        apply_attraction(&mut state, 0.1);
        assert_eq!(state.bodies[0].vel, Vec2::ZERO);
        assert!(state.ship.vel.is_finite());
    }

    #[test]
    fn test_maze_health_needs_same_cell() {
        let mut state = GameState::new(1, LevelTable::default(), 900.0, 1000.0);
        let maze = MazeGeometry::build(&default_maze(), state.arena);
        let here = maze.cell_center(Cell::new(3, 3), state.arena);
        let next = maze.cell_center(Cell::new(4, 3), state.arena);
        state.maze = Some(maze);

        state.ship.pos = here + Vec2::new(20.0, 0.0);
        add(&mut state, BodyKind::Health, next);
        add(&mut state, BodyKind::Health, here);

        apply_attraction(&mut state, 0.1);

        assert_eq!(state.bodies[0].vel, Vec2::ZERO);
        assert_ne!(state.bodies[1].vel, Vec2::ZERO);
    }
}
