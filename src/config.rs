//! Match Configuration
//!
//! Tunable match parameters. `Default` carries the stock game values; a
//! JSON file can override any subset of them.
//!
//! ```json
//! { "win_score": 5, "gamepad": { "fire_axis": 7 } }
//! ```

use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::rect::Rect;
use crate::core::tuning::{
    DRAFT_OFFER_SIZE, EXPLOSIVE_COOLDOWN_MS, JUMP_RATE_LIMIT_MS, MAX_BULLET_BOUNCES,
    SELF_IMMUNITY_MS, SHIELD_COOLDOWN_MS, SHIELD_SELF_IMMUNITY_MS, WIN_SCORE,
};
use crate::TICK_RATE;

/// Configuration loading / validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`MatchConfig`].
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Raw gamepad axis / button indices.
///
/// Defaults follow an Xbox-style controller in XInput mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepadBindings {
    /// Movement stick horizontal axis
    pub move_x_axis: usize,
    /// Movement stick vertical axis
    pub move_y_axis: usize,
    /// Aim stick horizontal axis
    pub aim_x_axis: usize,
    /// Aim stick vertical axis
    pub aim_y_axis: usize,
    /// Trigger axis held to latch
    pub latch_axis: usize,
    /// Trigger axis held to fire
    pub fire_axis: usize,
    /// Jump button
    pub jump_button: usize,
    /// Reload button
    pub reload_button: usize,
    /// Any of these buttons raises the shield
    pub shield_buttons: Vec<usize>,
}

impl Default for GamepadBindings {
    fn default() -> Self {
        Self {
            move_x_axis: 0,
            move_y_axis: 1,
            aim_x_axis: 2,
            aim_y_axis: 3,
            latch_axis: 4,
            fire_axis: 5,
            jump_button: 0,
            reload_button: 2,
            shield_buttons: vec![9, 10],
        }
    }
}

/// Configuration for a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Simulation rate (Hz)
    pub tick_rate: u32,
    /// Score that ends the match
    pub win_score: u32,
    /// Repeated reload requests restart the reload countdown
    pub reload_restarts_on_repeat: bool,
    /// Bullets are destroyed after this many bounces (`None` = unlimited)
    pub max_bullet_bounces: Option<u32>,
    /// Minimum time between jumps, both control schemes
    pub jump_rate_limit_ms: u64,
    /// Cooldown between shield bubbles
    pub shield_cooldown_ms: u64,
    /// Cooldown between explosive-bullet bursts on the same victim
    pub explosive_cooldown_ms: u64,
    /// Owner immunity window for bullet vs. body
    pub self_immunity_ms: u64,
    /// Owner immunity window for bullet vs. shield
    pub shield_self_immunity_ms: u64,
    /// Cards offered to each player per draft
    pub draft_offer_size: usize,
    /// Seed for draft offers
    pub rng_seed: u64,
    /// Bullets leaving this area are dropped (`None` = bullets live until they hit)
    pub bullet_cull_bounds: Option<Rect>,
    /// Gamepad index bindings
    pub gamepad: GamepadBindings,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            win_score: WIN_SCORE,
            reload_restarts_on_repeat: false,
            max_bullet_bounces: Some(MAX_BULLET_BOUNCES),
            jump_rate_limit_ms: JUMP_RATE_LIMIT_MS,
            shield_cooldown_ms: SHIELD_COOLDOWN_MS,
            explosive_cooldown_ms: EXPLOSIVE_COOLDOWN_MS,
            self_immunity_ms: SELF_IMMUNITY_MS,
            shield_self_immunity_ms: SHIELD_SELF_IMMUNITY_MS,
            draft_offer_size: DRAFT_OFFER_SIZE,
            rng_seed: 0x6775_6e64_6f77_6e00,
            bullet_cull_bounds: None,
            gamepad: GamepadBindings::default(),
        }
    }
}

impl MatchConfig {
    /// Parse and validate a JSON config. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive".into()));
        }
        if self.win_score == 0 {
            return Err(ConfigError::Invalid("win_score must be at least 1".into()));
        }
        if self.draft_offer_size == 0 {
            return Err(ConfigError::Invalid("draft_offer_size must be at least 1".into()));
        }
        if let Some(bounds) = &self.bullet_cull_bounds {
            if bounds.w <= 0.0 || bounds.h <= 0.0 {
                return Err(ConfigError::Invalid("bullet_cull_bounds must have a positive size".into()));
            }
        }
        Ok(())
    }
}
