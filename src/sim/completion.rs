//! Cell completion tracking

use glam::IVec2;

use super::blast::BlastResolver;
use super::events::{EventSink, GridEvent};
use super::grid::{CellPos, GridState};

/// Complete `cell` if all four of its edges are occupied, then look for blasts
///
/// No-op for off-grid or already complete cells. Returns true when the cell
/// was completed by this call.
pub fn check_and_complete(
    grid: &mut GridState,
    resolver: &mut BlastResolver,
    cell: CellPos,
    sink: &mut dyn EventSink,
) -> bool {
    match grid.cell(cell) {
        Some(c) if !c.complete => {}
        _ => return false,
    }
    if !grid.is_cell_enclosed(cell) {
        return false;
    }

    if let Some(c) = grid.cell_mut(cell) {
        c.complete = true;
    }
    log::debug!("Cell {cell} completed");
    sink.emit(&GridEvent::CellCompleted { cell });
    resolver.check_for_blast(grid, sink);
    true
}

impl GridState {
    /// Complete cells in row `y`; zero for rows off the grid
    pub fn completed_count_in_row(&self, y: i32) -> usize {
        (0..self.topology().cell_columns())
            .filter(|&x| self.is_cell_complete(IVec2::new(x, y)))
            .count()
    }

    /// Complete cells in column `x`; zero for columns off the grid
    pub fn completed_count_in_column(&self, x: i32) -> usize {
        (0..self.topology().cell_rows())
            .filter(|&y| self.is_cell_complete(IVec2::new(x, y)))
            .count()
    }
}
