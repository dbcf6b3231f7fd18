//! Nebula native entry point
//!
//! The browser build is driven from JavaScript through `platform::web`.
//! Natively there is no window; this runs a seeded headless session with
//! a scripted pilot and logs what happened.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Nebula (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(7);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use nebula::Settings;
    use nebula::highscores::{HighScores, serve_leaderboard};
    use nebula::sim::{GameEvent, GameOverStage, GameState, Phase};

    const DT: f32 = 1.0 / 60.0;
    /// Ten simulated minutes
    const MAX_FRAMES: usize = 60 * 60 * 10;

    pub fn run(seed: u64) {
        let settings = Settings::load();
        let mut state = GameState::with_settings(seed, &settings, 800.0, 600.0);
        let mut board = HighScores::load();
        state.leaderboard = board.clone();

        log::info!("Headless session with seed: {}", seed);
        state.on_press(None);

        let mut frames = 0;
        while frames < MAX_FRAMES {
            pilot(&mut state, frames);
            state.update(DT);
            frames += 1;

            for event in serve_leaderboard(&mut state, &mut board) {
                match event {
                    GameEvent::LevelStarted { level } => log::info!("Level {} started", level + 1),
                    GameEvent::WormholeOpened { level } => {
                        log::info!("Wormhole opened on level {}", level + 1)
                    }
                    GameEvent::ShipExploded { lives_left } => {
                        log::info!("Ship exploded, {} lives left", lives_left)
                    }
                    GameEvent::Captured { level } => log::info!("Captured on level {}", level + 1),
                    GameEvent::LevelComplete { level, bonus } => {
                        log::info!("Level {} complete, bonus {}", level + 1, bonus)
                    }
                    GameEvent::GameOver { score } => log::info!("Game over, score {}", score),
                    GameEvent::SubmitScore { name, score } => {
                        log::info!("Submitted {} for {}", score, name);
                        board.save();
                    }
                    GameEvent::FetchTopScores { .. } => {}
                }
            }

            if let Phase::GameOver(over) = &state.phase {
                if over.stage == GameOverStage::Summary {
                    break;
                }
            }
        }

        log::info!(
            "Session ended after {:.1}s: phase {}, level {}, score {}",
            frames as f32 * DT,
            state.phase.name(),
            state.level_index + 1,
            state.score
        );
        match board.top_score() {
            Some(top) => log::info!("Best local score: {}", top),
            None => log::info!("No local scores yet"),
        }
    }

    /// Pulse thrust on a fixed rhythm; type a name when asked
    fn pilot(state: &mut GameState, frame: usize) {
        if let Phase::GameOver(over) = &state.phase {
            if matches!(over.stage, GameOverStage::NameEntry { .. }) {
                for c in "AUTOPILOT".chars() {
                    state.on_name_char(c);
                }
                state.on_press(None);
            }
            return;
        }
        match frame % 75 {
            0 => state.on_press(None),
            20 => state.on_release(None),
            _ => {}
        }
    }
}
