//! Rules configuration
//!
//! Every field has a default equal to the constants in `blockfall-types`, so an empty JSON
//! object is a valid rules file. The session reads the rules once at construction.
//!
//! | Env var | Meaning |
//! |---------|---------|
//! | `BLOCKFALL_RULES` | Path to a JSON rules file. Unset or empty means defaults. |

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    DROP_INTERVALS, DROP_INTERVAL_FLOOR_MS, LINES_PER_LEVEL, LOCK_DELAY_MS, MAX_PREVIEW,
    PREVIEW_COUNT, SOFT_DROP_MULTIPLIER,
};

/// Environment variable holding the rules file path
pub const RULES_ENV: &str = "BLOCKFALL_RULES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rules json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid rules: {0}")]
    Invalid(String),
}

/// Single-player marathon or two-player battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Marathon,
    Battle,
}

/// Rule knobs for one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub mode: GameMode,
    /// Level at zero lines (1-based)
    pub start_level: u32,
    pub lines_per_level: u32,
    /// Gravity per level, index 0 = level 1
    pub drop_intervals_ms: Vec<u32>,
    /// Gravity for levels past the table
    pub drop_interval_floor_ms: u32,
    pub soft_drop_multiplier: u32,
    pub lock_delay_ms: u32,
    pub preview_count: usize,
    pub hold_enabled: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Marathon,
            start_level: 1,
            lines_per_level: LINES_PER_LEVEL,
            drop_intervals_ms: DROP_INTERVALS.to_vec(),
            drop_interval_floor_ms: DROP_INTERVAL_FLOOR_MS,
            soft_drop_multiplier: SOFT_DROP_MULTIPLIER,
            lock_delay_ms: LOCK_DELAY_MS,
            preview_count: PREVIEW_COUNT,
            hold_enabled: true,
        }
    }
}

impl RulesConfig {
    /// Defaults with the battle mode flag set
    pub fn battle() -> Self {
        Self {
            mode: GameMode::Battle,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON rules document
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// Load from the file named by `BLOCKFALL_RULES`, defaults when unset
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(RULES_ENV)
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        match path {
            Some(path) => Self::from_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Reject values that would stall the game; clamp the preview length.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.lines_per_level == 0 {
            return Err(ConfigError::Invalid("lines_per_level must be positive".into()));
        }
        if self.soft_drop_multiplier == 0 {
            return Err(ConfigError::Invalid(
                "soft_drop_multiplier must be positive".into(),
            ));
        }
        if self.drop_interval_floor_ms == 0 || self.drop_intervals_ms.contains(&0) {
            return Err(ConfigError::Invalid("drop intervals must be positive".into()));
        }
        if self.preview_count > MAX_PREVIEW {
            warn!(
                "preview_count {} exceeds {}, clamping",
                self.preview_count, MAX_PREVIEW
            );
            self.preview_count = MAX_PREVIEW;
        }
        Ok(self)
    }
}
