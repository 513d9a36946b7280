//! Game session layer
//!
//! Wraps a [`Board`](crate::sim::Board) with the hand of sticks, scoring,
//! collectible spawning and the win/loss state machine. Deterministic given
//! the level and seed.

pub mod items;
pub mod state;
pub mod tick;
pub mod win;

pub use items::ItemSpawner;
pub use state::{GameEvent, GamePhase, GameState, RejectReason};
pub use tick::{PlaceCommand, TickInput, best_move, tick};
pub use win::WinProgress;
