use std::path::Path;
use std::time::Duration;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Smallest board that fits the starting snake and food apart
pub const MIN_GRID_SIZE: usize = 5;
/// Largest board the terminal canvas can address
pub const MAX_GRID_SIZE: usize = 255;
pub const MAX_TICK_RATE: u32 = 60;
pub const MAX_CELL_WIDTH: u16 = 4;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square grid; must be odd
    pub grid_size: usize,
    /// Game ticks per second
    pub tick_rate: u32,
    /// Terminal columns used to draw one grid cell
    pub cell_width: u16,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 27,
            tick_rate: 4,
            cell_width: 2,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(9)
    }

    /// Loads configuration from a TOML file
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(grid_size = config.grid_size, tick_rate = config.tick_rate, "Config loaded");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::new(format!(
                "grid_size must be at least {}, got {}",
                MIN_GRID_SIZE, self.grid_size
            )));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::new(format!(
                "grid_size must be at most {}, got {}",
                MAX_GRID_SIZE, self.grid_size
            )));
        }
        if self.grid_size % 2 == 0 {
            return Err(ConfigError::new(format!(
                "grid_size must be odd, got {}",
                self.grid_size
            )));
        }
        if !(1..=MAX_TICK_RATE).contains(&self.tick_rate) {
            return Err(ConfigError::new(format!(
                "tick_rate must be between 1 and {}, got {}",
                MAX_TICK_RATE, self.tick_rate
            )));
        }
        if !(1..=MAX_CELL_WIDTH).contains(&self.cell_width) {
            return Err(ConfigError::new(format!(
                "cell_width must be between 1 and {}, got {}",
                MAX_CELL_WIDTH, self.cell_width
            )));
        }
        Ok(())
    }

    /// Time between two game ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
