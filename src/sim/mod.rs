//! Deterministic grid core
//!
//! All board logic lives here. This module must be pure and deterministic:
//! - No randomness (dealing and item spawns live in `game`)
//! - Stable iteration order (rows before columns, x before y)
//! - No rendering or platform dependencies
//! - Every mutation is reported through an [`EventSink`]

pub mod blast;
pub mod board;
pub mod completion;
pub mod connection;
pub mod events;
pub mod grid;
pub mod placement;
pub mod stick;

pub use blast::{BlastResolver, wave_points};
pub use board::Board;
pub use events::{BlastEvent, EventSink, GridEvent, Line};
pub use grid::{
    Axis, Cell, CellPos, Dot, DotPos, Edge, EdgeId, GridError, GridState, GridTopology, ItemKind,
    Theme,
};
pub use placement::{PlacementOutcome, PlacementPreview};
pub use stick::{Orientation, Stick, StickSegment, StickShape};
