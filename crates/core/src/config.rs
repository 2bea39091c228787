//! Tuning knobs for a generation run, loadable from TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::RoomType;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Regular rooms (the start room included) before the terminal room is
    /// placed; the actual target is drawn once per run from this range.
    pub min_rooms: u32,
    pub max_rooms: u32,
    /// Selection and placement tries per expansion request.
    pub max_room_attempts: u32,
    /// Gap between a parent exit and the child's entrance.
    pub room_spacing: f32,
    /// Minimum distance between any two room origins.
    pub min_room_distance: f32,
    pub repetition_penalty: f32,
    pub weight_decay: f32,
    /// Added to probability entries flagged `luck_affected`.
    pub luck_bonus: f32,
    pub combat_room_types: Vec<RoomType>,
    pub transition: TransitionTimings,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_rooms: 10,
            max_rooms: 14,
            max_room_attempts: 10,
            room_spacing: 4.0,
            min_room_distance: 20.0,
            repetition_penalty: 0.5,
            weight_decay: 0.3,
            luck_bonus: 0.0,
            combat_room_types: vec![RoomType::Combat, RoomType::Boss],
            transition: TransitionTimings::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTimings {
    pub fade_out_secs: f32,
    pub fade_in_secs: f32,
    pub entrance_unlock_delay_secs: f32,
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self { fade_out_secs: 0.4, fade_in_secs: 0.4, entrance_unlock_delay_secs: 1.0 }
    }
}

impl GenerationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_rooms == 0 || self.min_rooms > self.max_rooms {
            return Err(ConfigError::InvalidRoomRange { min: self.min_rooms, max: self.max_rooms });
        }
        if self.max_room_attempts == 0 {
            return Err(ConfigError::NonPositive { field: "max_room_attempts", value: 0.0 });
        }
        if self.min_room_distance <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "min_room_distance",
                value: self.min_room_distance,
            });
        }
        if self.repetition_penalty <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "repetition_penalty",
                value: self.repetition_penalty,
            });
        }
        let non_negative = [
            ("room_spacing", self.room_spacing),
            ("weight_decay", self.weight_decay),
            ("luck_bonus", self.luck_bonus),
            ("transition.fade_out_secs", self.transition.fade_out_secs),
            ("transition.fade_in_secs", self.transition.fade_in_secs),
            ("transition.entrance_unlock_delay_secs", self.transition.entrance_unlock_delay_secs),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }

    pub fn is_combat_room(&self, room_type: RoomType) -> bool {
        self.combat_room_types.contains(&room_type)
    }
}
