//! Game tuning and preferences
//!
//! Loaded from a JSON file on native, from LocalStorage on the web. Every
//! section falls back to its defaults when missing.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::category::{CategoryTable, CategoryWeights, ObstacleCategory};

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{category:?} spawn weight is negative ({value})")]
    NegativeWeight { category: ObstacleCategory, value: f32 },
    #[error("{category:?} scale must be positive (got {value})")]
    NonPositiveScale { category: ObstacleCategory, value: f32 },
    #[error("obstacle speed range is inverted ({min} > {max})")]
    SpeedRange { min: f32, max: f32 },
    #[error("boost multiplier must be greater than 1 (got {0})")]
    BoostMultiplier(f32),
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
}

/// Obstacle generation and boost tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    /// Relative spawn chances (need not sum to 1)
    pub weights: CategoryWeights,
    /// Uniform scale per category
    pub scales: CategoryTable<f32>,
    /// Launch speed range, divided by scale at activation
    pub min_speed: f32,
    pub max_speed: f32,
    /// Launch spin is drawn from [-max_spin, max_spin]
    pub max_spin: f32,
    pub boost_multiplier: f32,
    /// Seconds of real time
    pub boost_duration: f32,
    pub bounce_effect_lifetime: f32,
    /// Procedural variants generated per category
    pub variants_per_category: usize,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            scales: CategoryTable {
                tiny: 0.5,
                small: 1.0,
                medium: 1.5,
                big: 2.0,
            },
            min_speed: OBSTACLE_MIN_SPEED,
            max_speed: OBSTACLE_MAX_SPEED,
            max_spin: OBSTACLE_MAX_SPIN,
            boost_multiplier: BOOST_MULTIPLIER,
            boost_duration: BOOST_DURATION,
            bounce_effect_lifetime: BOUNCE_EFFECT_LIFETIME,
            variants_per_category: 3,
        }
    }
}

/// Rocket control tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Acceleration while thrust is held (units/s²)
    pub thrust_force: f32,
    pub max_speed: f32,
    /// Stick readings at or below this magnitude are ignored
    pub deadzone: f32,
    pub score_per_second: f32,
    /// Seconds between game over and removal of the wreck
    pub removal_delay: f32,
    pub explosion_effect_lifetime: f32,
    pub radius: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            thrust_force: PLAYER_THRUST,
            max_speed: PLAYER_MAX_SPEED,
            deadzone: STICK_DEADZONE,
            score_per_second: SCORE_PER_SECOND,
            removal_delay: PLAYER_REMOVAL_DELAY,
            explosion_effect_lifetime: EXPLOSION_EFFECT_LIFETIME,
            radius: PLAYER_RADIUS,
        }
    }
}

/// Play area layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub half_extents: Vec2,
    /// Obstacles spawned when the scene loads
    pub obstacle_count: usize,
    pub spawn_safe_radius: f32,
    /// Obstacles farther than half_extents + cull_margin are removed
    pub cull_margin: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            half_extents: Vec2::new(ARENA_HALF_WIDTH, ARENA_HALF_HEIGHT),
            obstacle_count: 12,
            spawn_safe_radius: SPAWN_SAFE_RADIUS,
            cull_margin: 3.0,
        }
    }
}

/// Audio preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

/// Everything tunable about a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub obstacle: ObstacleTuning,
    pub player: PlayerTuning,
    pub arena: ArenaTuning,
    pub audio: AudioSettings,
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject tuning the simulation cannot run with.
    ///
    /// An all-zero weight table is allowed; category selection falls back to
    /// `Small` in that case.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let o = &self.obstacle;
        for category in ObstacleCategory::ALL {
            let weight = o.weights.0.get(category);
            if weight < 0.0 {
                return Err(SettingsError::NegativeWeight {
                    category,
                    value: weight,
                });
            }
            let scale = o.scales.get(category);
            if scale <= 0.0 {
                return Err(SettingsError::NonPositiveScale {
                    category,
                    value: scale,
                });
            }
        }
        if o.min_speed > o.max_speed {
            return Err(SettingsError::SpeedRange {
                min: o.min_speed,
                max: o.max_speed,
            });
        }
        if o.boost_multiplier <= 1.0 {
            return Err(SettingsError::BoostMultiplier(o.boost_multiplier));
        }

        let non_negative = [
            ("obstacle.min_speed", o.min_speed),
            ("obstacle.max_spin", o.max_spin),
            ("obstacle.boost_duration", o.boost_duration),
            ("player.thrust_force", self.player.thrust_force),
            ("player.max_speed", self.player.max_speed),
            ("player.deadzone", self.player.deadzone),
            ("player.removal_delay", self.player.removal_delay),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(SettingsError::Negative { field, value });
            }
        }
        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write settings as pretty JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from `path`, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load_from(path.as_ref()) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.as_ref().display());
                settings
            }
            Err(err) => {
                log::warn!("Using default settings: {err}");
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "rocket_drift_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(err) => log::warn!("Ignoring stored settings: {err}"),
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "player": { "max_speed": 7.5 } }"#).unwrap();
        assert_eq!(settings.player.max_speed, 7.5);
        assert_eq!(settings.player.deadzone, STICK_DEADZONE);
        assert_eq!(settings.obstacle.boost_multiplier, BOOST_MULTIPLIER);
    }

    #[test]
    fn test_zero_weights_are_allowed() {
        let json = r#"{ "obstacle": { "weights": { "tiny": 0, "small": 0, "medium": 0, "big": 0 } } }"#;
        assert!(Settings::from_json(json).is_ok());
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut settings = Settings::default();
        settings.obstacle.weights.0.medium = -0.5;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::NegativeWeight {
                category: ObstacleCategory::Medium,
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_inverted_speed_range() {
        let mut settings = Settings::default();
        settings.obstacle.min_speed = 4.0;
        settings.obstacle.max_speed = 2.0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::SpeedRange { .. })
        ));
    }

    #[test]
    fn test_rejects_weak_boost() {
        let mut settings = Settings::default();
        settings.obstacle.boost_multiplier = 1.0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::BoostMultiplier(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!(
            "rocket_drift_settings_{}.json",
            std::process::id()
        ));
        let mut settings = Settings::default();
        settings.arena.obstacle_count = 5;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.arena.obstacle_count, 5);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_or_default("/definitely/not/here.json");
        assert_eq!(settings.arena.obstacle_count, ArenaTuning::default().obstacle_count);
    }
}
