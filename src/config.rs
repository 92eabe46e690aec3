use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::data::{GameData, RoomId};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed reading config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed parsing config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Server tunables. Every field has a default so an empty config file (or no
/// file at all) produces a playable server.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Base game clock granularity.
    pub tick_interval_ms: u64,
    /// Combat rounds advance every this many ticks.
    pub combat_ticks: u64,
    /// Fraction of max health recovered per tick while out of combat.
    pub regen_rate_per_tick: f32,
    /// Uniform damage variance applied to all strikes, as a fraction.
    pub damage_variance: f32,
    pub flee_success_chance: f32,
    /// Where characters without a bound homestone respawn.
    pub default_respawn_room: RoomId,
    /// Defeated enemies return this many ticks after death.
    pub enemy_respawn_ticks: u64,
    /// Maximum distinct inventory entries (stacks) per character.
    pub inventory_capacity: usize,
    pub name_min_len: usize,
    pub name_max_len: usize,
    pub password_min_len: usize,
    pub save_retry_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
            combat_ticks: 8,
            regen_rate_per_tick: 0.05,
            damage_variance: 0.2,
            flee_success_chance: 0.5,
            default_respawn_room: RoomId::from("town.square"),
            enemy_respawn_ticks: 120,
            inventory_capacity: 30,
            name_min_len: 3,
            name_max_len: 12,
            password_min_len: 3,
            save_retry_limit: 3,
        }
    }
}

impl ServerConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: ServerConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be > 0".into()));
        }
        if self.combat_ticks == 0 {
            return Err(ConfigError::Invalid("combat_ticks must be > 0".into()));
        }
        if self.enemy_respawn_ticks == 0 {
            return Err(ConfigError::Invalid("enemy_respawn_ticks must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.regen_rate_per_tick) || self.regen_rate_per_tick == 0.0 {
            return Err(ConfigError::Invalid(
                "regen_rate_per_tick must be within (0, 1]".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.damage_variance) {
            return Err(ConfigError::Invalid(
                "damage_variance must be within [0, 1)".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.flee_success_chance) {
            return Err(ConfigError::Invalid(
                "flee_success_chance must be within [0, 1]".into(),
            ));
        }
        if self.inventory_capacity == 0 {
            return Err(ConfigError::Invalid("inventory_capacity must be > 0".into()));
        }
        if self.name_min_len == 0 || self.name_min_len > self.name_max_len {
            return Err(ConfigError::Invalid(
                "name length bounds must satisfy 0 < min <= max".into(),
            ));
        }
        if !self.default_respawn_room.is_qualified() {
            return Err(ConfigError::Invalid(format!(
                "default_respawn_room {} is not of the form area.room",
                self.default_respawn_room
            )));
        }
        Ok(())
    }

    /// Content cross-check, run after the template store has loaded.
    pub fn validate_against_content(&self, data: &GameData) -> Result<(), ConfigError> {
        if data.get_room(&self.default_respawn_room).is_none() {
            return Err(ConfigError::Invalid(format!(
                "default_respawn_room {} does not exist in loaded content",
                self.default_respawn_room
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
