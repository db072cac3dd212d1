//! Game settings and per-round tuning
//!
//! Settings are persisted in LocalStorage; `GameConfig` is derived from them
//! when a round starts.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::KeyBindings;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Dust pool size for this preset
    pub fn dust_capacity(&self) -> usize {
        match self {
            QualityPreset::Low => 120,
            QualityPreset::Medium => DUST_CAPACITY,
            QualityPreset::High => 400,
        }
    }

    /// Stars in the sky backdrop
    pub fn star_count(&self) -> usize {
        match self {
            QualityPreset::Low => 150,
            QualityPreset::Medium => 400,
            QualityPreset::High => 800,
        }
    }
}

/// Tuning for a single round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seeds obstacle placement, dust and stars
    pub seed: u64,
    pub planet_radius: f32,
    pub surface_clearance: f32,
    /// Obstacles scattered when the model loads
    pub obstacle_count: usize,
    /// Placeholder boxes when it doesn't
    pub fallback_obstacle_count: usize,
    pub obstacle_model_path: String,
    /// 0 disables the dust trail
    pub dust_capacity: usize,
    pub star_count: usize,
    /// `None` for an endless round
    pub time_limit_secs: Option<f32>,
    pub bindings: KeyBindings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            planet_radius: PLANET_RADIUS,
            surface_clearance: SURFACE_CLEARANCE,
            obstacle_count: OBSTACLE_COUNT,
            fallback_obstacle_count: FALLBACK_OBSTACLE_COUNT,
            obstacle_model_path: "assets/tree.json".to_string(),
            dust_capacity: DUST_CAPACITY,
            star_count: QualityPreset::Medium.star_count(),
            time_limit_secs: Some(TIME_LIMIT_SECS),
            bindings: KeyBindings::default(),
        }
    }
}

impl GameConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Dust trail behind the car
    pub dust: bool,
    /// Show FPS counter
    pub show_fps: bool,
    /// Key bindings (platform key codes)
    #[serde(default)]
    pub bindings: KeyBindings,
    /// Round length in seconds, `None` for endless
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: Option<f32>,
}

fn default_time_limit() -> Option<f32> {
    Some(TIME_LIMIT_SECS)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            dust: true,
            show_fps: false,
            bindings: KeyBindings::default(),
            time_limit_secs: default_time_limit(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective dust pool size
    pub fn dust_capacity(&self) -> usize {
        if self.dust {
            self.quality.dust_capacity()
        } else {
            0
        }
    }

    /// Round tuning for a fresh seed
    pub fn game_config(&self, seed: u64) -> GameConfig {
        GameConfig {
            seed,
            dust_capacity: self.dust_capacity(),
            star_count: self.quality.star_count(),
            time_limit_secs: self.time_limit_secs,
            bindings: self.bindings.clone(),
            ..GameConfig::default()
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "headlight_planet_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(err) => log::warn!("Ignoring corrupt settings: {err}"),
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
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::parse("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::Low.as_str(), "Low");
    }

    #[test]
    fn test_game_config_from_settings() {
        let mut settings = Settings::from_preset(QualityPreset::High);
        settings.time_limit_secs = None;
        let config = settings.game_config(99);
        assert_eq!(config.seed, 99);
        assert_eq!(config.dust_capacity, 400);
        assert_eq!(config.star_count, 800);
        assert_eq!(config.time_limit_secs, None);
        assert_eq!(config.obstacle_count, OBSTACLE_COUNT);
        assert_eq!(config.fallback_obstacle_count, FALLBACK_OBSTACLE_COUNT);
    }

    #[test]
    fn test_dust_disabled() {
        let settings = Settings {
            dust: false,
            ..Settings::default()
        };
        assert_eq!(settings.dust_capacity(), 0);
    }

    #[test]
    fn test_settings_round_trip_fills_defaults() {
        let json = r#"{ "quality": "Low", "dust": true, "show_fps": true }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.quality, QualityPreset::Low);
        assert_eq!(settings.bindings, KeyBindings::default());
        assert_eq!(settings.time_limit_secs, Some(TIME_LIMIT_SECS));
    }
}
