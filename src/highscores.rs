//! High score leaderboard
//!
//! The local table is cached in the game state for qualification and as a
//! fallback when the remote leaderboard does not answer. The remote side is
//! reached through the `Leaderboard` trait, driven by the events the
//! simulation queues.

use serde::{Deserialize, Serialize};

use crate::sim::{GameEvent, GameState};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 12;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: u64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// High score leaderboard, sorted descending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<ScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "nebula_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from unsorted entries, keeping the top ten
    pub fn from_entries(mut entries: Vec<ScoreEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score (if it qualifies); returns the 1-indexed rank
    pub fn add_score(&mut self, name: &str, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = ScoreEntry::new(sanitize_name(name), score);

        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return Self::from_entries(scores.entries);
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Keep letters, digits and spaces; trim and cap the length
pub fn sanitize_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .take(MAX_NAME_LEN)
        .collect();
    let name = name.trim();
    if name.is_empty() {
        "PILOT".to_string()
    } else {
        name.to_string()
    }
}

/// Remote score storage
///
/// Calls are made by the driver between ticks, never from inside the
/// simulation.
pub trait Leaderboard {
    fn fetch_top_scores(&mut self, limit: usize) -> Vec<ScoreEntry>;
    fn submit_score(&mut self, name: &str, score: u64);
}

/// The local table doubles as an in-process leaderboard
impl Leaderboard for HighScores {
    fn fetch_top_scores(&mut self, limit: usize) -> Vec<ScoreEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }

    fn submit_score(&mut self, name: &str, score: u64) {
        self.add_score(name, score);
    }
}

/// Drain the outbox and answer leaderboard requests synchronously
///
/// Returns the events that are not leaderboard traffic.
pub fn serve_leaderboard<L: Leaderboard>(state: &mut GameState, board: &mut L) -> Vec<GameEvent> {
    let mut rest = Vec::new();
    for event in state.drain_events() {
        match event {
            GameEvent::FetchTopScores { limit } => {
                let scores = board.fetch_top_scores(limit);
                state.receive_top_scores(scores);
            }
            GameEvent::SubmitScore { name, score } => {
                board.submit_score(&name, score);
                rest.push(GameEvent::SubmitScore { name, score });
            }
            other => rest.push(other),
        }
    }
    rest
}
