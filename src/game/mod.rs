//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The board is a torus: leaving one edge re-enters from the opposite one.

pub mod action;
pub mod config;
pub mod engine;
pub mod grid;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use config::{ConfigError, GameConfig};
pub use engine::{Game, StepOutcome, INITIAL_SNAKE_LENGTH};
pub use grid::{CellState, Grid};
pub use state::{GameStatus, Outcome, Position, Snake};
