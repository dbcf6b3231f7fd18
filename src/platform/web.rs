//! Browser driver
//!
//! JavaScript owns the canvas and the animation frame loop; it calls into
//! `WebGame` each frame and draws from the JSON snapshot.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::highscores::{HighScores, ScoreEntry};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Nebula starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let mut state = GameState::with_settings(seed, &settings, width, height);
        state.leaderboard = HighScores::load();
        log::info!("Game initialized with seed: {}", seed);
        WebGame { state }
    }

    /// Advance by `dt` seconds of wall time
    pub fn update(&mut self, dt: f32) {
        self.state.update(dt);
    }

    /// Pointer down; coordinates are optional for keyboard-driven thrust
    pub fn on_press(&mut self, x: Option<f32>, y: Option<f32>) {
        self.state.on_press(point(x, y));
    }

    pub fn on_release(&mut self, x: Option<f32>, y: Option<f32>) {
        self.state.on_release(point(x, y));
    }

    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.state.on_resize(width, height);
    }

    /// Keyboard input for name entry
    pub fn on_key(&mut self, key: String) {
        match key.as_str() {
            "Backspace" => self.state.on_name_backspace(),
            "Enter" => {
                self.state.on_press(None);
                self.state.on_release(None);
            }
            _ => {
                let mut chars = key.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    self.state.on_name_char(c);
                }
            }
        }
    }

    pub fn snapshot_json(&self) -> String {
        match self.state.snapshot_json() {
            Ok(json) => json,
            Err(e) => {
                log::error!("Snapshot serialization failed: {}", e);
                String::from("{}")
            }
        }
    }

    /// Drain the outbox as a JSON array
    ///
    /// Submitted scores are also persisted to the local table.
    pub fn drain_events_json(&mut self) -> String {
        let events = self.state.drain_events();
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::SubmitScore { .. }))
        {
            self.state.leaderboard.save();
        }
        match serde_json::to_string(&events) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Event serialization failed: {}", e);
                String::from("[]")
            }
        }
    }

    /// Answer a `fetch_top_scores` request with a JSON array of entries
    pub fn receive_top_scores_json(&mut self, json: &str) {
        match serde_json::from_str::<Vec<ScoreEntry>>(json) {
            Ok(entries) => self.state.receive_top_scores(entries),
            Err(e) => log::warn!("Ignoring malformed leaderboard response: {}", e),
        }
    }

    pub fn phase(&self) -> String {
        self.state.phase.name().to_string()
    }
}

fn point(x: Option<f32>, y: Option<f32>) -> Option<Vec2> {
    Some(Vec2::new(x?, y?))
}
