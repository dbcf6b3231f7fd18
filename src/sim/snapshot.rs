//! Read-only view of the state for renderers and drivers

use glam::Vec2;
use serde::Serialize;

use super::state::{
    Body, Flashes, Fragment, GameState, IcePatch, Phase, Ship, StatusEffects, Wormhole,
};
use crate::tuning::LEVEL_START_QUOTES;
use crate::ui::Buttons;

/// HUD scalars
#[derive(Debug, Clone, Serialize)]
pub struct HudView {
    pub energy: f32,
    pub display_energy: f32,
    pub score: u64,
    pub display_score: u64,
    pub warp: u32,
    pub goal: u32,
    pub lives: u8,
    pub level: usize,
}

/// Everything a frame needs to draw
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub arena: Vec2,
    pub phase: &'a Phase,
    pub ship: &'a Ship,
    pub invulnerable: bool,
    pub bodies: &'a [Body],
    pub fragments: &'a [Fragment],
    pub wormhole: Option<&'a Wormhole>,
    pub ice_patches: &'a [IcePatch],
    /// Wall segments in pixels, with the attractor flag
    pub maze_walls: Vec<(Vec2, Vec2, bool)>,
    pub effects: &'a StatusEffects,
    pub flashes: &'a Flashes,
    pub hud: HudView,
    pub buttons: &'a Buttons,
    pub quote: Option<&'static str>,
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot<'_> {
        let maze_walls = self
            .maze
            .as_ref()
            .map(|maze| {
                maze.walls
                    .iter()
                    .map(|wall| {
                        let (a, b) = wall.to_px(self.arena);
                        (a, b, wall.attractor)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let quote = match &self.phase {
            Phase::BetweenLevels(inter) => inter
                .quote
                .and_then(|i| LEVEL_START_QUOTES.get(i).copied()),
            _ => None,
        };

        Snapshot {
            arena: self.arena,
            phase: &self.phase,
            ship: &self.ship,
            invulnerable: self.invuln > 0.0,
            bodies: &self.bodies,
            fragments: &self.fragments,
            wormhole: self.wormhole.as_ref(),
            ice_patches: &self.ice_patches,
            maze_walls,
            effects: &self.effects,
            flashes: &self.flashes,
            hud: HudView {
                energy: self.energy,
                display_energy: self.hud.energy,
                score: self.score,
                display_score: self.hud.score.round() as u64,
                warp: self.warp,
                goal: self.score_goal(),
                lives: self.lives,
                level: self.level_index,
            },
            buttons: &self.buttons,
            quote,
        }
    }

    /// Snapshot as JSON for script-side renderers
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::phase::enter_level;
    use crate::tuning::LevelTable;

    #[test]
    fn test_snapshot_exposes_maze_walls() {
        let mut state = GameState::new(1, LevelTable::default(), 800.0, 600.0);
        enter_level(&mut state, 0);
        let snap = state.snapshot();
        assert!(!snap.maze_walls.is_empty());
        assert!(snap.wormhole.is_some());
        assert_eq!(snap.hud.goal, 100);
        assert!(snap.maze_walls.iter().all(|(a, b, _)| {
            a.x >= 0.0 && a.x <= 800.0 && b.y >= 0.0 && b.y <= 600.0
        }));
    }

    #[test]
    fn test_snapshot_json_tags_phase() {
        let state = GameState::new(1, LevelTable::default(), 800.0, 600.0);
        let json = state.snapshot_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["phase"]["phase"], "start");
        assert_eq!(value["hud"]["lives"], 3);
    }
}
