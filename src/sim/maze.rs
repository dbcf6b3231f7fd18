//! Maze walls: geometry, ship collision and attractor pull
//!
//! Walls are stored in normalized [0,1] play-area coordinates so a resize
//! rescales them for free. Pixel positions are derived on demand.

use glam::Vec2;
use serde::Serialize;

use super::collision::{CollisionResult, reflect_velocity};
use super::integrate::bounce_off_bounds;
use super::phase::trigger_explosion;
use super::state::{GameState, HitTint};
use crate::closest_point_on_segment;
use crate::consts::*;
use crate::tuning::{Cell, MazeDefinition, Side};

/// Separation kept between ship and wall after a push-out
const WALL_SKIN: f32 = 0.01;

/// One wall face in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WallSegment {
    pub a: Vec2,
    pub b: Vec2,
    /// Cell whose mask produced this face
    pub cell: Cell,
    pub side: Side,
    pub attractor: bool,
}

impl WallSegment {
    /// Endpoints in pixels
    pub fn to_px(&self, arena: Vec2) -> (Vec2, Vec2) {
        (self.a * arena, self.b * arena)
    }

    /// Face borders `cell` (own face or the neighbour's matching face)
    pub fn borders(&self, cell: Cell) -> bool {
        self.cell == cell || self.cell.neighbor(self.side) == Some(cell)
    }
}

/// A maze level's wall layout
#[derive(Debug, Clone, Serialize)]
pub struct MazeGeometry {
    #[serde(skip)]
    def: MazeDefinition,
    /// Top-left of the grid, normalized
    pub origin: Vec2,
    /// Size of one cell, normalized
    pub cell_size: Vec2,
    pub walls: Vec<WallSegment>,
}

impl MazeGeometry {
    /// Convert a definition to wall segments for the current play area
    pub fn build(def: &MazeDefinition, arena: Vec2) -> Self {
        let cols = def.cols().max(1) as f32;
        let rows = def.rows().max(1) as f32;
        let inset = Vec2::new(MAZE_INSET / arena.x, MAZE_INSET / arena.y);
        let top = (MAZE_UI_HEIGHT / arena.y).min(0.5);
        let origin = Vec2::new(inset.x, top + inset.y);
        let extent = (Vec2::ONE - origin - inset).max(Vec2::splat(0.01));
        let cell_size = extent / Vec2::new(cols, rows);

        let mut walls = Vec::new();
        for (row, masks) in def.grid.iter().enumerate() {
            for (col, &mask) in masks.iter().enumerate() {
                let cell = Cell::new(col, row);
                let tl = origin + cell_size * Vec2::new(col as f32, row as f32);
                let br = tl + cell_size;
                for side in Side::ALL {
                    if mask & side.bit() == 0 {
                        continue;
                    }
                    let (a, b) = match side {
                        Side::Top => (tl, Vec2::new(br.x, tl.y)),
                        Side::Right => (Vec2::new(br.x, tl.y), br),
                        Side::Bottom => (Vec2::new(tl.x, br.y), br),
                        Side::Left => (tl, Vec2::new(tl.x, br.y)),
                    };
                    let attractor = def
                        .attractor_walls
                        .iter()
                        .any(|w| w.cell == cell && w.side == side);
                    walls.push(WallSegment {
                        a,
                        b,
                        cell,
                        side,
                        attractor,
                    });
                }
            }
        }

        for wall in &def.attractor_walls {
            if def.walls(wall.cell) & wall.side.bit() == 0 {
                log::warn!(
                    "Attractor at ({}, {}) {:?} has no wall",
                    wall.cell.col,
                    wall.cell.row,
                    wall.side
                );
            }
        }

        Self {
            def: def.clone(),
            origin,
            cell_size,
            walls,
        }
    }

    pub fn definition(&self) -> &MazeDefinition {
        &self.def
    }

    pub fn entry(&self) -> Cell {
        self.def.entry
    }

    pub fn exit(&self) -> Cell {
        self.def.exit
    }

    /// Pixel centre of a cell
    pub fn cell_center(&self, cell: Cell, arena: Vec2) -> Vec2 {
        let center = self.origin
            + self.cell_size * Vec2::new(cell.col as f32 + 0.5, cell.row as f32 + 0.5);
        center * arena
    }

    /// Outer rectangle of the grid in pixels (top-left, bottom-right)
    pub fn grid_rect(&self, arena: Vec2) -> (Vec2, Vec2) {
        let dims = Vec2::new(self.def.cols().max(1) as f32, self.def.rows().max(1) as f32);
        (self.origin * arena, (self.origin + self.cell_size * dims) * arena)
    }

    /// Grid cell containing a pixel position; None outside the grid
    pub fn cell_at(&self, pos: Vec2, arena: Vec2) -> Option<Cell> {
        let local = (pos / arena - self.origin) / self.cell_size;
        if !local.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let cell = Cell::new(local.x as usize, local.y as usize);
        self.def.contains(cell).then_some(cell)
    }
}

/// Circle-vs-segment contact
pub fn circle_segment_contact(center: Vec2, radius: f32, a: Vec2, b: Vec2) -> CollisionResult {
    let closest = closest_point_on_segment(center, a, b);
    let offset = center - closest;
    let dist_sq = offset.length_squared();
    if dist_sq >= radius * radius {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > f32::EPSILON {
        offset / dist
    } else {
        // Centre sits on the wall line: use the segment's perpendicular
        let dir = (b - a).normalize_or_zero();
        Vec2::new(-dir.y, dir.x)
    };

    CollisionResult {
        hit: true,
        point: closest,
        normal,
        penetration: radius - dist,
    }
}

/// Resolve the first wall the ship penetrates; true if one was hit
pub fn resolve_wall_collision(state: &mut GameState) -> bool {
    if !state.ship.alive {
        return false;
    }
    let Some(maze) = &state.maze else {
        return false;
    };
    let arena = state.arena;
    let contact = maze.walls.iter().find_map(|wall| {
        let (a, b) = wall.to_px(arena);
        let contact = circle_segment_contact(state.ship.pos, SHIP_RADIUS, a, b);
        contact.hit.then_some(contact)
    });
    let Some(contact) = contact else {
        return false;
    };

    let ship = &mut state.ship;
    ship.pos = contact.point + contact.normal * (SHIP_RADIUS + WALL_SKIN);
    if ship.vel.dot(contact.normal) < 0.0 {
        ship.vel = reflect_velocity(ship.vel, contact.normal) * MAZE_BOUNCE_DAMP;
        if let Some(frozen) = state.effects.frozen_vel.as_mut() {
            *frozen = reflect_velocity(*frozen, contact.normal) * MAZE_BOUNCE_DAMP;
        }
    }

    if state.phase.is_playing() && state.invuln <= 0.0 {
        state.flashes.hit(HitTint::Wall, HIT_FLASH);
        if state.drain_energy(MAZE_WALL_DAMAGE) {
            trigger_explosion(state);
        }
    }
    true
}

/// Pull the ship toward attractor faces bordering its cell
pub fn apply_attractor_walls(state: &mut GameState, dt: f32) {
    if !state.ship.alive {
        return;
    }
    let Some(maze) = &state.maze else {
        return;
    };
    let arena = state.arena;
    let Some(cell) = maze.cell_at(state.ship.pos, arena) else {
        return;
    };

    let mut accel = Vec2::ZERO;
    for wall in maze.walls.iter().filter(|w| w.attractor && w.borders(cell)) {
        let (a, b) = wall.to_px(arena);
        let closest = closest_point_on_segment(state.ship.pos, a, b);
        accel += (closest - state.ship.pos).normalize_or_zero() * ATTRACTOR_FORCE;
    }
    state.ship.vel += accel * dt;
}

/// Keep the ship inside the grid where a boundary face is open
pub fn contain_in_grid(state: &mut GameState) -> bool {
    if !state.ship.alive || state.maze.is_none() {
        return false;
    }
    bounce_off_bounds(state, MAZE_BOUNCE_DAMP)
}

/// Per-tick maze systems: wall collision, containment, then attractor pull
pub fn update_maze(state: &mut GameState, dt: f32) {
    if state.maze.is_none() {
        return;
    }
    resolve_wall_collision(state);
    contain_in_grid(state);
    apply_attractor_walls(state, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Phase;
    use crate::tuning::{LevelTable, default_maze};

    fn maze_state() -> GameState {
        let mut state = GameState::new(3, LevelTable::default(), 900.0, 1000.0);
        state.maze = Some(MazeGeometry::build(&default_maze(), state.arena));
        state.phase = Phase::Playing;
        state
    }

    #[test]
    fn test_build_emits_one_segment_per_bit() {
        let def = default_maze();
        let geometry = MazeGeometry::build(&def, Vec2::new(900.0, 1000.0));
        let bits: u32 = def.grid.iter().flatten().map(|m| m.count_ones()).sum();
        assert_eq!(geometry.walls.len(), bits as usize);
        assert_eq!(geometry.walls.iter().filter(|w| w.attractor).count(), 1);
    }

    #[test]
    fn test_cell_lookup_round_trips_centres() {
        let arena = Vec2::new(900.0, 1000.0);
        let geometry = MazeGeometry::build(&default_maze(), arena);
        let exit = geometry.exit();
        let center = geometry.cell_center(exit, arena);
        assert_eq!(geometry.cell_at(center, arena), Some(exit));
        assert_eq!(geometry.cell_at(Vec2::new(-10.0, 5.0), arena), None);
        assert_eq!(geometry.cell_at(Vec2::new(450.0, 2000.0), arena), None);
    }

    #[test]
    fn test_neighbor_face_borders_both_cells() {
        let wall = WallSegment {
            a: Vec2::ZERO,
            b: Vec2::X,
            cell: Cell::new(2, 3),
            side: Side::Left,
            attractor: true,
        };
        assert!(wall.borders(Cell::new(2, 3)));
        assert!(wall.borders(Cell::new(1, 3)));
        assert!(!wall.borders(Cell::new(3, 3)));
    }

    #[test]
    fn test_circle_segment_contact() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(100.0, 0.0);
        let hit = circle_segment_contact(Vec2::new(50.0, 10.0), 14.0, a, b);
        assert!(hit.hit);
        assert_eq!(hit.normal, Vec2::Y);
        assert!((hit.penetration - 4.0).abs() < 1e-5);
        assert!(!circle_segment_contact(Vec2::new(50.0, 20.0), 14.0, a, b).hit);
    }

    #[test]
    fn test_wall_hit_pushes_out_and_reflects() {
        let mut state = maze_state();
        let maze = state.maze.clone().unwrap();
        let wall = maze.walls[0];
        let (a, b) = wall.to_px(state.arena);
        let mid = (a + b) * 0.5;
        let dir = (b - a).normalize();
        let normal = Vec2::new(-dir.y, dir.x);
        // Approach the wall from the normal side
        state.ship.pos = mid + normal * (SHIP_RADIUS - 5.0);
        state.ship.vel = -normal * 100.0 + dir * 20.0;
        let energy = state.energy;

        assert!(resolve_wall_collision(&mut state));

        let closest = closest_point_on_segment(state.ship.pos, a, b);
        assert!(state.ship.pos.distance(closest) >= SHIP_RADIUS - 1e-3);
        assert!(state.ship.vel.dot(normal) > 0.0);
        assert!((state.energy - (energy - MAZE_WALL_DAMAGE)).abs() < 1e-6);
        assert_eq!(state.flashes.hit_tint, HitTint::Wall);
    }

    #[test]
    fn test_wall_hit_can_explode() {
        let mut state = maze_state();
        let maze = state.maze.clone().unwrap();
        let (a, b) = maze.walls[0].to_px(state.arena);
        state.ship.pos = (a + b) * 0.5;
        state.energy = 0.04;
        assert!(resolve_wall_collision(&mut state));
        assert!(!state.ship.alive);
    }

    #[test]
    fn test_attractor_pulls_toward_wall() {
        let mut state = maze_state();
        let maze = state.maze.clone().unwrap();
        let cell = Cell::new(2, 3);
        state.ship.pos = maze.cell_center(cell, state.arena);
        state.ship.vel = Vec2::ZERO;
        apply_attractor_walls(&mut state, 0.1);
        // Attractor is the cell's left face
        assert!(state.ship.vel.x < 0.0);
        assert!((state.ship.vel.length() - ATTRACTOR_FORCE * 0.1).abs() < 1e-3);

        // Also felt from the neighbour across that face
        state.ship.pos = maze.cell_center(Cell::new(1, 3), state.arena);
        state.ship.vel = Vec2::ZERO;
        apply_attractor_walls(&mut state, 0.1);
        assert!(state.ship.vel.x > 0.0);
    }

    #[test]
    fn test_open_exit_face_keeps_ship_in_grid() {
        let mut state = GameState::new(3, LevelTable::default(), 800.0, 600.0);
        crate::sim::phase::enter_level(&mut state, 0);
        let maze = state.maze.clone().unwrap();
        let exit = maze.cell_center(maze.exit(), state.arena);
        state.ship.pos = exit + Vec2::new(40.0, 0.0);
        state.ship.vel = Vec2::new(0.0, 200.0);

        for _ in 0..120 {
            crate::sim::tick(&mut state, 1.0 / 60.0);
            if !state.phase.is_playing() || !state.ship.alive {
                break;
            }
            let (min, max) = state.ship_bounds();
            assert!(state.ship.pos.cmpge(min - 1e-3).all());
            assert!(state.ship.pos.cmple(max + 1e-3).all());
        }
        let (_, bottom_right) = maze.grid_rect(state.arena);
        assert!(state.ship.pos.y <= bottom_right.y);
    }

    #[test]
    fn test_containment_bounces_with_maze_damping() {
        let mut state = maze_state();
        let (_, max) = state.ship_bounds();
        state.ship.pos = Vec2::new(max.x - 30.0, max.y + 5.0);
        state.ship.vel = Vec2::new(0.0, 100.0);
        assert!(contain_in_grid(&mut state));
        assert!((state.ship.pos.y - max.y).abs() < 1e-4);
        assert!((state.ship.vel.y + 100.0 * MAZE_BOUNCE_DAMP).abs() < 1e-4);
    }

    #[test]
    fn test_no_pull_far_from_attractor() {
        let mut state = maze_state();
        let maze = state.maze.clone().unwrap();
        state.ship.pos = maze.cell_center(Cell::new(4, 0), state.arena);
        state.ship.vel = Vec2::ZERO;
        apply_attractor_walls(&mut state, 0.1);
        assert_eq!(state.ship.vel, Vec2::ZERO);
    }
}
