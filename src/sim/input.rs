//! Driver input: presses, releases, resizes and name entry

use glam::Vec2;

use super::phase::{self, begin_countdown};
use super::state::{GameOverStage, GameState, Phase};
use crate::highscores::ScoreEntry;
use crate::ui::{Buttons, activates};

enum PressAction {
    Start,
    Thrust,
    Submit,
    Ignore,
}

impl GameState {
    /// Pointer/key down. `at` is None for keyboard-style input.
    pub fn on_press(&mut self, at: Option<Vec2>) {
        let action = match &self.phase {
            Phase::Start if activates(&self.buttons.start, at) => PressAction::Start,
            Phase::Playing if self.ship.alive => PressAction::Thrust,
            Phase::GameOver(over) => match over.stage {
                GameOverStage::NameEntry { .. } if activates(&self.buttons.submit, at) => {
                    PressAction::Submit
                }
                GameOverStage::Summary if activates(&self.buttons.restart, at) => {
                    PressAction::Start
                }
                _ => PressAction::Ignore,
            },
            _ => PressAction::Ignore,
        };

        match action {
            PressAction::Start => begin_countdown(self),
            PressAction::Thrust => self.ship.begin_thrust(),
            PressAction::Submit => phase::submit_name(self),
            PressAction::Ignore => {}
        }
    }

    /// Pointer/key up
    pub fn on_release(&mut self, _at: Option<Vec2>) {
        self.ship.end_thrust();
    }

    /// Rescale absolute positions to a new play-area size
    pub fn on_resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::warn!("Ignoring resize to {}x{}", width, height);
            return;
        }
        let new_arena = Vec2::new(width, height);
        let scale = new_arena / self.arena;
        self.arena = new_arena;

        self.ship.pos *= scale;
        for body in &mut self.bodies {
            body.pos *= scale;
        }
        for fragment in &mut self.fragments {
            fragment.pos *= scale;
        }
        for patch in &mut self.ice_patches {
            patch.pos *= scale;
        }
        if let Some(wormhole) = self.wormhole.as_mut() {
            wormhole.pos *= scale;
        }

        let (min, max) = self.ship_bounds();
        self.ship.pos = self.ship.pos.clamp(min, max);
        self.buttons = Buttons::layout(new_arena);
        log::debug!("Resized to {}x{}", width, height);
    }

    /// Typed character during name entry
    pub fn on_name_char(&mut self, c: char) {
        phase::push_name_char(self, c);
    }

    pub fn on_name_backspace(&mut self) {
        phase::pop_name_char(self);
    }

    /// Leaderboard answer delivered by the driver
    pub fn receive_top_scores(&mut self, entries: Vec<ScoreEntry>) {
        phase::resolve_top_scores(self, Some(entries));
    }
}
