//! The level-exit wormhole: placement, pull and capture detection

use glam::Vec2;

use super::phase::begin_capture;
use super::state::{GameEvent, GameState, Wormhole};
use crate::consts::*;

/// Open-level placement: the quadrant opposite the ship
pub fn open_wormhole_position(ship: Vec2, arena: Vec2) -> Vec2 {
    let x = if ship.x < arena.x * 0.5 {
        arena.x - WORMHOLE_INSET
    } else {
        WORMHOLE_INSET
    };
    let y = if ship.y < arena.y * 0.5 {
        arena.y - WORMHOLE_INSET
    } else {
        HUD_SAFE_BOTTOM + WORMHOLE_INSET
    };
    Vec2::new(x, y)
}

/// Open a pulling wormhole opposite the ship
pub fn spawn_wormhole(state: &mut GameState) {
    let pos = open_wormhole_position(state.ship.pos, state.arena);
    state.wormhole = Some(Wormhole {
        pos,
        radius: WORMHOLE_RADIUS,
        phase: 0.0,
        pulls: true,
    });
    log::debug!("Wormhole opened at ({:.0}, {:.0})", pos.x, pos.y);
    state.push_event(GameEvent::WormholeOpened {
        level: state.level_index,
    });
}

/// Place the passive exit wormhole in the maze's exit cell
pub fn spawn_maze_wormhole(state: &mut GameState) {
    let Some(maze) = &state.maze else {
        return;
    };
    let pos = maze.cell_center(maze.exit(), state.arena);
    state.wormhole = Some(Wormhole {
        pos,
        radius: MAZE_WORMHOLE_RADIUS,
        phase: 0.0,
        pulls: false,
    });
    state.push_event(GameEvent::WormholeOpened {
        level: state.level_index,
    });
}

/// Ship is within capture distance of the wormhole
pub fn in_capture_range(wormhole: &Wormhole, ship: Vec2) -> bool {
    let reach = wormhole.capture_distance();
    wormhole.pos.distance_squared(ship) <= reach * reach
}

/// Open, animate and pull; starts capture when the ship arrives
pub fn update_wormhole(state: &mut GameState, dt: f32) {
    let playing = state.phase.is_playing();

    if playing
        && state.wormhole.is_none()
        && !state.is_maze_level()
        && state.warp >= state.score_goal()
    {
        spawn_wormhole(state);
    }

    let Some(wormhole) = state.wormhole.as_mut() else {
        return;
    };
    wormhole.phase = (wormhole.phase + WORMHOLE_SPIN * dt) % std::f32::consts::TAU;

    if !playing || !state.ship.alive {
        return;
    }

    if wormhole.pulls {
        let dir = (wormhole.pos - state.ship.pos).normalize_or_zero();
        state.ship.vel += dir * WORMHOLE_PULL * dt;
    }

    if in_capture_range(wormhole, state.ship.pos) {
        begin_capture(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Phase;
    use crate::tuning::LevelTable;

    fn playing() -> GameState {
        let mut state = GameState::new(8, LevelTable::default(), 800.0, 600.0);
        state.level_index = 1;
        state.phase = Phase::Playing;
        state
    }

    #[test]
    fn test_opposite_quadrant() {
        let arena = Vec2::new(800.0, 600.0);
        let pos = open_wormhole_position(Vec2::new(100.0, 100.0), arena);
        assert_eq!(pos, Vec2::new(740.0, 540.0));
        let pos = open_wormhole_position(Vec2::new(700.0, 500.0), arena);
        assert_eq!(pos, Vec2::new(WORMHOLE_INSET, HUD_SAFE_BOTTOM + WORMHOLE_INSET));
    }

    #[test]
    fn test_goal_opens_wormhole_once() {
        let mut state = playing();
        state.warp = state.score_goal() - 1;
        update_wormhole(&mut state, 0.016);
        assert!(state.wormhole.is_none());

        state.warp = state.score_goal();
        update_wormhole(&mut state, 0.016);
        let first = state.wormhole.clone().expect("wormhole opened");
        update_wormhole(&mut state, 0.016);
        assert_eq!(state.wormhole.as_ref().map(|w| w.pos), Some(first.pos));
        let opened = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::WormholeOpened { .. }))
            .count();
        assert_eq!(opened, 1);
    }

    #[test]
    fn test_pull_toward_wormhole() {
        let mut state = playing();
        state.ship.vel = Vec2::ZERO;
        spawn_wormhole(&mut state);
        let to_hole = state.wormhole.as_ref().unwrap().pos - state.ship.pos;
        update_wormhole(&mut state, 0.1);
        assert!(state.ship.vel.dot(to_hole) > 0.0);
        assert!((state.ship.vel.length() - WORMHOLE_PULL * 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_capture_is_idempotent() {
        let mut state = playing();
        spawn_wormhole(&mut state);
        state.ship.pos = state.wormhole.as_ref().unwrap().pos;
        state.warp = 40;

        update_wormhole(&mut state, 0.016);
        assert!(state.phase.is_captured());
        assert!(state.score_locked);
        let Phase::Captured { timer, warp_from } = state.phase else {
            panic!("not captured");
        };

        update_wormhole(&mut state, 0.016);
        let Phase::Captured {
            timer: timer2,
            warp_from: from2,
        } = state.phase
        else {
            panic!("not captured");
        };
        assert_eq!(timer, timer2);
        assert_eq!(warp_from, from2);
        let captures = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Captured { .. }))
            .count();
        assert_eq!(captures, 1);
    }

    #[test]
    fn test_passive_wormhole_needs_close_approach() {
        let wormhole = Wormhole {
            pos: Vec2::ZERO,
            radius: MAZE_WORMHOLE_RADIUS,
            phase: 0.0,
            pulls: false,
        };
        assert!(in_capture_range(&wormhole, Vec2::new(SHIP_RADIUS, 0.0)));
        assert!(!in_capture_range(&wormhole, Vec2::new(SHIP_RADIUS + 1.0, 0.0)));

        let open = Wormhole {
            pulls: true,
            radius: WORMHOLE_RADIUS,
            ..wormhole
        };
        assert!(in_capture_range(
            &open,
            Vec2::new(WORMHOLE_RADIUS + SHIP_RADIUS * 0.7, 0.0)
        ));
    }
}
