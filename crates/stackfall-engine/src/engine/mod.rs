//! Game rules and state management.
//!
//! This module drives the core data structures through a game:
//!
//! - [`GameEngine`] - The orchestrator (grid, falling piece, hold, score)
//! - [`EngineConfig`] - Grid dimensions and spawn placement
//! - [`PieceBag`] - 7-bag piece generation with a look-ahead queue
//! - [`RotationCursor`] - Orientation tracking for the falling piece
//! - [`Score`] - Cumulative score with change notifications
//! - [`GameStats`] - Locked pieces and line-clear counters
//! - [`LevelTable`] - Score-to-level and level-to-speed mapping for drivers
//! - [`Command`] - Discrete driver commands and their script tokens
//! - [`ViewSnapshot`] / [`DownResult`] - Copied-out views for rendering
//!
//! # Game Flow
//!
//! 1. Create a [`GameEngine`]; it spawns the first piece
//! 2. The driver moves, rotates or holds the falling piece
//! 3. Gravity ([`GameEngine::soft_drop`]) or a hard drop locks it
//! 4. Full rows are cleared, the bonus is scored and the next piece spawns
//! 5. Repeat until a spawn collides
//!
//! The engine keeps no clock. Drivers schedule soft drops themselves, using
//! [`LevelTable`] to pick the interval for the current score.

pub use self::{
    command::*, config::*, game_engine::*, game_stats::*, level::*, piece_bag::*, rotation::*,
    score::*, snapshot::*,
};

mod command;
mod config;
mod game_engine;
mod game_stats;
mod level;
mod piece_bag;
mod rotation;
mod score;
mod snapshot;
