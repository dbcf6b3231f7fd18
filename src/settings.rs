//! Host/driver settings
//!
//! Persisted separately from high scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, STARTING_LIVES};
use crate::tuning::LevelTable;

/// Score goals are divided by this in quick-level mode
pub const QUICK_GOAL_DIVISOR: u32 = 8;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Largest dt one update may advance (seconds)
    pub max_frame_dt: f32,
    /// Spare lives at the start of a run
    pub starting_lives: u8,
    /// Shrink score goals to reach level ends quickly
    pub quick_levels: bool,
    /// Optional level table override (JSON array of level records)
    pub level_table_json: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_frame_dt: MAX_FRAME_DT,
            starting_lives: STARTING_LIVES,
            quick_levels: false,
            level_table_json: None,
        }
    }
}

impl Settings {
    /// Effective dt clamp; nonsense values fall back to the default
    pub fn effective_max_dt(&self) -> f32 {
        if self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0 {
            self.max_frame_dt.min(0.25)
        } else {
            MAX_FRAME_DT
        }
    }

    /// Level table to play, with overrides and quick mode applied
    pub fn level_table(&self) -> LevelTable {
        let table = match &self.level_table_json {
            Some(json) => LevelTable::from_json(json).unwrap_or_else(|e| {
                log::warn!("Ignoring level table override: {}", e);
                LevelTable::default()
            }),
            None => LevelTable::default(),
        };
        if self.quick_levels {
            table.with_quick_goals(QUICK_GOAL_DIVISOR)
        } else {
            table
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "nebula_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"quick_levels":true}"#).unwrap();
        assert!(settings.quick_levels);
        assert_eq!(settings.starting_lives, STARTING_LIVES);
        assert_eq!(settings.max_frame_dt, MAX_FRAME_DT);
    }

    #[test]
    fn test_bad_max_dt_falls_back() {
        let mut settings = Settings::default();
        settings.max_frame_dt = f32::NAN;
        assert_eq!(settings.effective_max_dt(), MAX_FRAME_DT);
        settings.max_frame_dt = -1.0;
        assert_eq!(settings.effective_max_dt(), MAX_FRAME_DT);
        settings.max_frame_dt = 10.0;
        assert_eq!(settings.effective_max_dt(), 0.25);
    }

    #[test]
    fn test_quick_levels_shrink_goals() {
        let settings = Settings {
            quick_levels: true,
            ..Settings::default()
        };
        let table = settings.level_table();
        assert_eq!(table.get(1).score_goal, 25);
    }

    #[test]
    fn test_bad_override_falls_back_to_default() {
        let settings = Settings {
            level_table_json: Some("not json".into()),
            ..Settings::default()
        };
        assert_eq!(settings.level_table(), LevelTable::default());
    }
}
