//! Notifications emitted by the grid core
//!
//! Scoring and presentation collaborators implement [`EventSink`]. Sinks only
//! ever see a shared reference to the event; the grid is mutably borrowed for
//! the whole placement, so a sink cannot reach back into it.

use serde::{Deserialize, Serialize};

use super::grid::{CellPos, EdgeId, ItemKind};

/// A fully complete row or column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Line {
    Row(i32),
    Column(i32),
}

/// One wave of a blast cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastEvent {
    /// Lines cleared together in this wave (rows first, then columns)
    pub lines: Vec<Line>,
    /// Combo counter after this wave
    pub combo: u32,
    /// Points awarded for this wave
    pub points: u64,
}

impl BlastEvent {
    pub fn lines_cleared(&self) -> usize {
        self.lines.len()
    }
}

/// Everything the core reports to its collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridEvent {
    EdgeOccupied { edge: EdgeId },
    CellCompleted { cell: CellPos },
    LinesBlasted(BlastEvent),
    /// Cell lost completion because a neighbouring blast freed one of its edges
    CellDowngraded { cell: CellPos },
    ItemCollected { cell: CellPos, item: ItemKind },
}

/// Receiver of grid notifications
pub trait EventSink {
    fn emit(&mut self, event: &GridEvent);
}

/// Discards everything
impl EventSink for () {
    fn emit(&mut self, _event: &GridEvent) {}
}

/// Records everything
impl EventSink for Vec<GridEvent> {
    fn emit(&mut self, event: &GridEvent) {
        self.push(event.clone());
    }
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: &GridEvent) {
        (**self).emit(event);
    }
}

/// Fan out to two sinks (e.g. scoring and presentation)
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &GridEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    #[test]
    fn test_tuple_sink_fans_out() {
        let mut score: Vec<GridEvent> = Vec::new();
        let mut presentation: Vec<GridEvent> = Vec::new();
        {
            let mut sink = (&mut score, &mut presentation);
            sink.emit(&GridEvent::CellCompleted { cell: IVec2::new(1, 1) });
        }
        assert_eq!(score.len(), 1);
        assert_eq!(score, presentation);
    }

    #[test]
    fn test_rows_sort_before_columns() {
        let mut lines = vec![Line::Column(0), Line::Row(2), Line::Row(1)];
        lines.sort();
        assert_eq!(lines, vec![Line::Row(1), Line::Row(2), Line::Column(0)]);
    }
}
