//! Torus Snake - single-player Snake on a wrap-around board
//!
//! This library provides:
//! - Core game logic (game module)
//! - Keyboard mapping (input module)
//! - TUI rendering (render module)
//! - Session clock and counters (metrics module)
//! - The interactive tick loop (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
