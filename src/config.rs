use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const GRID_SIZE: u32 = 25;
pub const CELL_SIZE: u32 = 20;
pub const INITIAL_SNAKE_LENGTH: u32 = 3;
pub const INITIAL_ENERGY: i32 = 100;
pub const ENERGY_DECREASE_PER_STEP: u32 = 1;
pub const ENERGY_INCREASE_PER_FOOD: u32 = 50;
pub const GAME_SPEED_MS: u64 = 150;
pub const SENSOR_DIRECTIONS: usize = 8;

/// Largest supported side length; keeps every coordinate and cell count well inside `i32`.
pub const MAX_GRID_SIDE: u32 = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },
    #[error("grid side {0} exceeds the supported maximum of {max}", max = MAX_GRID_SIDE)]
    GridTooLarge(u32),
    #[error("initial snake length must be at least 1")]
    EmptySnake,
    #[error("initial snake of length {length} does not fit left of the centre column of a {width}-wide grid")]
    SnakeDoesNotFit { length: u32, width: u32 },
    #[error("a {width}x{height} grid leaves no free cell for food next to a snake of length {length}")]
    NoRoomForFood { length: u32, width: u32, height: u32 },
    #[error("initial energy must be positive, got {0}")]
    NonPositiveEnergy(i32),
    #[error("only {supported} vision directions are supported, got {0}", supported = SENSOR_DIRECTIONS)]
    UnsupportedSensorDirections(usize),
}

/// Engine configuration. Every field has a default so partial TOML files work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    /// Pixel size of a cell for renderers; ignored by the engine.
    pub cell_size: u32,
    pub initial_snake_length: u32,
    pub initial_energy: i32,
    pub energy_decrease_per_step: u32,
    pub energy_increase_per_food: u32,
    /// Tick interval for real-time drivers; ignored by the engine.
    pub game_speed_ms: u64,
    pub sensor_directions: usize,
    /// Fixed seed for food placement. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: GRID_SIZE,
            grid_height: GRID_SIZE,
            cell_size: CELL_SIZE,
            initial_snake_length: INITIAL_SNAKE_LENGTH,
            initial_energy: INITIAL_ENERGY,
            energy_decrease_per_step: ENERGY_DECREASE_PER_STEP,
            energy_increase_per_food: ENERGY_INCREASE_PER_FOOD,
            game_speed_ms: GAME_SPEED_MS,
            sensor_directions: SENSOR_DIRECTIONS,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn square(size: u32) -> Self {
        Self {
            grid_width: size,
            grid_height: size,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.grid_width, self.grid_height);
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        if let Some(side) = [width, height].into_iter().find(|&s| s > MAX_GRID_SIDE) {
            return Err(ConfigError::GridTooLarge(side));
        }
        let length = self.initial_snake_length;
        if length == 0 {
            return Err(ConfigError::EmptySnake);
        }
        // The body extends left from the centre column.
        if length > width / 2 + 1 {
            return Err(ConfigError::SnakeDoesNotFit { length, width });
        }
        if u64::from(width) * u64::from(height) <= u64::from(length) {
            return Err(ConfigError::NoRoomForFood { length, width, height });
        }
        if self.initial_energy <= 0 {
            return Err(ConfigError::NonPositiveEnergy(self.initial_energy));
        }
        if self.sensor_directions != SENSOR_DIRECTIONS {
            return Err(ConfigError::UnsupportedSensorDirections(self.sensor_directions));
        }
        Ok(())
    }

    pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(src).context("parsing game config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("loading {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = GameConfig::default();
        assert_eq!(c.grid_width, 25);
        assert_eq!(c.initial_snake_length, 3);
        assert_eq!(c.initial_energy, 100);
        assert_eq!(c.energy_decrease_per_step, 1);
        assert_eq!(c.energy_increase_per_food, 50);
        assert_eq!(c.validate(), Ok(()));
    }

    #[test]
    fn rejects_snake_wider_than_half_grid() {
        let c = GameConfig {
            initial_snake_length: 4,
            ..GameConfig::square(5)
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::SnakeDoesNotFit { length: 4, width: 5 })
        );
        let c = GameConfig {
            initial_snake_length: 3,
            ..GameConfig::square(5)
        };
        assert_eq!(c.validate(), Ok(()));
    }

    #[test]
    fn rejects_full_board() {
        let c = GameConfig {
            grid_width: 2,
            grid_height: 1,
            initial_snake_length: 2,
            ..GameConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::NoRoomForFood { .. })));
    }

    #[test]
    fn rejects_bad_energy_and_sensors() {
        let c = GameConfig {
            initial_energy: 0,
            ..GameConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::NonPositiveEnergy(0)));
        let c = GameConfig {
            sensor_directions: 4,
            ..GameConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::UnsupportedSensorDirections(4)));
    }

    #[test]
    fn rejects_empty_and_huge_grids() {
        assert!(matches!(
            GameConfig::square(0).validate(),
            Err(ConfigError::EmptyGrid { .. })
        ));
        assert_eq!(
            GameConfig::square(MAX_GRID_SIDE + 1).validate(),
            Err(ConfigError::GridTooLarge(MAX_GRID_SIDE + 1))
        );
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let c = GameConfig::from_toml_str("grid_width = 30\nseed = 7\n").unwrap();
        assert_eq!(c.grid_width, 30);
        assert_eq!(c.grid_height, 25);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.initial_energy, 100);
    }

    #[test]
    fn invalid_toml_config_is_reported() {
        let err = GameConfig::from_toml_str("initial_energy = -5\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::NonPositiveEnergy(-5))
        );
    }
}
