//! Hazard merging and health cleanup
//!
//! Both passes rescan from scratch after every change, so removals never
//! shift an index that is still being used.

use super::state::{Body, BodyKind, GameState};
use crate::consts::*;
use crate::tuning::TypeBoost;

/// Combine two plain hazards into an elite
///
/// Radius² is the mass for the weighted average of position and velocity.
pub fn merge_pair(a: &Body, b: &Body, id: u32, boost: &TypeBoost) -> Body {
    let ma = a.radius * a.radius;
    let mb = b.radius * b.radius;
    let total = (ma + mb).max(f32::EPSILON);
    let pos = (a.pos * ma + b.pos * mb) / total;
    let vel = (a.vel * ma + b.vel * mb) / total;

    let mut elite = Body::new(
        id,
        BodyKind::HazardElite,
        pos,
        a.radius.max(b.radius) * ELITE_RADIUS_SCALE,
    );
    elite.vel = vel * ELITE_VELOCITY_SCALE;
    elite.grav_mult = ELITE_GRAV_MULT;
    elite.attract_mult = ELITE_ATTRACT_MULT;
    elite.speed_mult = ELITE_SPEED_MULT;
    elite.spawn_time = elite.spawn_duration;
    elite.apply_boost(boost);
    elite
}

fn find_hazard_pair(bodies: &[Body]) -> Option<(usize, usize)> {
    for i in (0..bodies.len()).rev() {
        if bodies[i].kind != BodyKind::Hazard {
            continue;
        }
        for j in (0..i).rev() {
            if bodies[j].kind == BodyKind::Hazard && bodies[i].overlaps(&bodies[j]) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Merge every overlapping pair of plain hazards; returns merge count
pub fn merge_hazards(state: &mut GameState) -> usize {
    let boost = state.level().type_boost;
    let mut merges = 0;

    while let Some((i, j)) = find_hazard_pair(&state.bodies) {
        let id = state.next_entity_id();
        let elite = merge_pair(&state.bodies[i], &state.bodies[j], id, &boost);
        log::debug!(
            "Merged hazards {} and {} into elite {}",
            state.bodies[i].id,
            state.bodies[j].id,
            id
        );
        // i > j, so removing i first keeps j valid
        state.bodies.remove(i);
        state.bodies.remove(j);
        state.bodies.push(elite);
        merges += 1;
    }
    merges
}

fn find_doomed_health(bodies: &[Body]) -> Option<usize> {
    bodies.iter().position(|health| {
        health.kind == BodyKind::Health
            && !health.maze_item
            && bodies
                .iter()
                .any(|other| other.kind.is_hazardous() && other.overlaps(health))
    })
}

/// Hazards touching a health pickup destroy the pickup and survive
pub fn cleanup_health(state: &mut GameState) {
    while let Some(index) = find_doomed_health(&state.bodies) {
        state.bodies.remove(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Phase;
    use crate::tuning::LevelTable;
    use glam::Vec2;
    use proptest::prelude::*;

    fn state() -> GameState {
        let mut state = GameState::new(9, LevelTable::default(), 800.0, 600.0);
        state.level_index = 1;
        state.phase = Phase::Playing;
        state
    }

    fn hazard(state: &mut GameState, pos: Vec2, vel: Vec2, radius: f32) {
        let id = state.next_entity_id();
        let mut body = Body::new(id, BodyKind::Hazard, pos, radius);
        body.vel = vel;
        state.bodies.push(body);
    }

    #[test]
    fn test_equal_hazards_merge() {
        let mut state = state();
        hazard(&mut state, Vec2::new(100.0, 100.0), Vec2::new(10.0, 0.0), 6.0);
        hazard(&mut state, Vec2::new(105.0, 100.0), Vec2::new(-10.0, 20.0), 6.0);

        assert_eq!(merge_hazards(&mut state), 1);

        assert_eq!(state.bodies.len(), 1);
        let elite = &state.bodies[0];
        assert_eq!(elite.kind, BodyKind::HazardElite);
        assert!((elite.radius - 6.0 * ELITE_RADIUS_SCALE).abs() < 1e-5);
        assert!((elite.vel - Vec2::new(0.0, 10.0) * ELITE_VELOCITY_SCALE).length() < 1e-4);
        assert!((elite.pos - Vec2::new(102.5, 100.0)).length() < 1e-4);
        assert_eq!(elite.grav_mult, ELITE_GRAV_MULT);
    }

    #[test]
    fn test_elite_takes_level_boost() {
        let a = Body::new(1, BodyKind::Hazard, Vec2::ZERO, 5.0);
        let b = Body::new(2, BodyKind::Hazard, Vec2::X, 5.0);
        let elite = merge_pair(&a, &b, 3, &TypeBoost::uniform(2.0));
        assert!((elite.grav_mult - ELITE_GRAV_MULT * 2.0).abs() < 1e-5);
        assert!((elite.speed_mult - ELITE_SPEED_MULT * 2.0).abs() < 1e-5);
        assert_eq!(elite.attract_mult, ELITE_ATTRACT_MULT);
    }

    #[test]
    fn test_chain_merges_restart_scan() {
        let mut state = state();
        // Three overlapping hazards: one merge, the elite does not merge again
        hazard(&mut state, Vec2::new(100.0, 100.0), Vec2::ZERO, 6.0);
        hazard(&mut state, Vec2::new(104.0, 100.0), Vec2::ZERO, 6.0);
        hazard(&mut state, Vec2::new(108.0, 100.0), Vec2::ZERO, 6.0);
        // Two more far away
        hazard(&mut state, Vec2::new(400.0, 400.0), Vec2::ZERO, 6.0);
        hazard(&mut state, Vec2::new(404.0, 400.0), Vec2::ZERO, 6.0);

        assert_eq!(merge_hazards(&mut state), 2);
        assert_eq!(state.bodies.len(), 3);
        let elites = state
            .bodies
            .iter()
            .filter(|b| b.kind == BodyKind::HazardElite)
            .count();
        assert_eq!(elites, 2);
    }

    #[test]
    fn test_elites_and_coins_do_not_merge() {
        let mut state = state();
        let mut elite = Body::new(state.next_entity_id(), BodyKind::HazardElite, Vec2::ZERO, 6.0);
        elite.pos = Vec2::new(50.0, 50.0);
        state.bodies.push(elite);
        hazard(&mut state, Vec2::new(52.0, 50.0), Vec2::ZERO, 6.0);
        let coin = Body::new(state.next_entity_id(), BodyKind::Coin, Vec2::new(51.0, 50.0), 5.0);
        state.bodies.push(coin);
        assert_eq!(merge_hazards(&mut state), 0);
        assert_eq!(state.bodies.len(), 3);
    }

    #[test]
    fn test_health_cleanup_spares_hazard_and_maze_items() {
        let mut state = state();
        hazard(&mut state, Vec2::new(100.0, 100.0), Vec2::ZERO, 6.0);
        let id = state.next_entity_id();
        state
            .bodies
            .push(Body::new(id, BodyKind::Health, Vec2::new(104.0, 100.0), 6.0));
        let id = state.next_entity_id();
        let mut item = Body::new(id, BodyKind::Health, Vec2::new(96.0, 100.0), 6.0);
        item.maze_item = true;
        state.bodies.push(item);

        cleanup_health(&mut state);

        assert_eq!(state.bodies.len(), 2);
        assert_eq!(state.bodies[0].kind, BodyKind::Hazard);
        assert!(state.bodies[1].maze_item);
    }

    proptest! {
        #[test]
        fn prop_merge_is_mass_weighted(
            r1 in 2.0f32..20.0,
            r2 in 2.0f32..20.0,
            vx1 in -200.0f32..200.0,
            vy1 in -200.0f32..200.0,
            vx2 in -200.0f32..200.0,
            vy2 in -200.0f32..200.0,
        ) {
            let mut a = Body::new(1, BodyKind::Hazard, Vec2::ZERO, r1);
            a.vel = Vec2::new(vx1, vy1);
            let mut b = Body::new(2, BodyKind::Hazard, Vec2::new(1.0, 0.0), r2);
            b.vel = Vec2::new(vx2, vy2);

            let elite = merge_pair(&a, &b, 3, &TypeBoost::default());

            let (m1, m2) = (r1 * r1, r2 * r2);
            let expected = (a.vel * m1 + b.vel * m2) / (m1 + m2) * ELITE_VELOCITY_SCALE;
            prop_assert!((elite.vel - expected).length() < 1e-2);
            prop_assert!((elite.radius - r1.max(r2) * ELITE_RADIUS_SCALE).abs() < 1e-4);
        }
    }
}
