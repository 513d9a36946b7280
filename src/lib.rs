//! Stick Blast - a dots-and-edges line-clearing puzzle
//!
//! Core modules:
//! - `sim`: Deterministic board core (grid, placement, completion, blasts)
//! - `level`: Data-driven level definitions loaded from JSON
//! - `game`: Session state on top of the board (hand, score, win/loss)

pub mod game;
pub mod level;
pub mod sim;

pub use game::{GameEvent, GamePhase, GameState, PlaceCommand, TickInput, tick};
pub use level::{LevelDefinition, LevelError};
pub use sim::Board;

/// Game configuration constants
pub mod consts {
    /// Default board size in dots
    pub const DEFAULT_GRID_WIDTH: i32 = 6;
    pub const DEFAULT_GRID_HEIGHT: i32 = 6;
    /// Smallest board with at least one cell
    pub const MIN_GRID_DIM: i32 = 2;
    pub const MAX_GRID_DIM: i32 = 32;

    /// A wave clearing `n` lines scores `BASE_LINE_POINTS * 2^n`
    pub const BASE_LINE_POINTS: u64 = 10;

    /// Sticks offered to the player at once
    pub const DEFAULT_HAND_SIZE: usize = 3;
    pub const MAX_HAND_SIZE: usize = 8;

    /// Session ticks per second
    pub const TICK_RATE: u64 = 60;
    /// Collectible spawn cadence (5 seconds)
    pub const ITEM_SPAWN_INTERVAL_TICKS: u64 = 5 * TICK_RATE;
    pub const INITIAL_ITEM_SPAWN_COUNT: usize = 3;
    pub const MAX_CONCURRENT_ITEMS: usize = 5;
}
