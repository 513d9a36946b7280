//! Line blasts and chain reactions
//!
//! A wave runs strictly in this order:
//! detect -> score -> reset cells -> reset edges -> reset dots -> downgrade -> re-detect
//!
//! Later steps read state written by earlier ones, so the order is fixed.

use std::collections::BTreeSet;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::events::{BlastEvent, EventSink, GridEvent, Line};
use super::grid::{CellPos, EdgeId, GridState, GridTopology};
use crate::consts::BASE_LINE_POINTS;

/// Cascade state: re-entrancy guard and combo counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastResolver {
    #[serde(skip)]
    blasting: bool,
    combo: u32,
}

/// Raised for the lifetime of a cascade; lowered on drop, including unwinding
struct BlastingFlag<'a>(&'a mut bool);

impl<'a> BlastingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for BlastingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl BlastResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successive blast waves since the last placement
    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn is_blasting(&self) -> bool {
        self.blasting
    }

    /// Start a new combo lineage (called by every placement)
    pub fn reset_combo(&mut self) {
        self.combo = 0;
    }

    /// Blast every complete line, repeating until the grid is stable
    ///
    /// Does nothing while a cascade is already running. Returns the number of
    /// waves resolved.
    pub fn check_for_blast(&mut self, grid: &mut GridState, sink: &mut dyn EventSink) -> usize {
        let Self { blasting, combo } = self;
        if *blasting {
            return 0;
        }
        let _flag = BlastingFlag::raise(blasting);
        resolve_cascade(grid, combo, sink)
    }
}

/// Points for one wave: `2^lines * 10`, saturating
pub fn wave_points(lines: usize) -> u64 {
    let exponent = u32::try_from(lines).unwrap_or(u32::MAX);
    BASE_LINE_POINTS.saturating_mul(2u64.saturating_pow(exponent))
}

fn resolve_cascade(grid: &mut GridState, combo: &mut u32, sink: &mut dyn EventSink) -> usize {
    // Every wave clears at least one cell, so the cell count bounds the cascade
    let max_waves = grid.topology().cell_count();
    let mut waves = 0;

    while waves < max_waves {
        let lines = detect_blastable_lines(grid);
        if lines.is_empty() {
            return waves;
        }
        waves += 1;
        *combo += 1;

        let event = BlastEvent {
            points: wave_points(lines.len()),
            combo: *combo,
            lines,
        };
        log::debug!(
            "Blast wave {}: {} line(s) {:?}, combo {}, +{} points",
            waves,
            event.lines_cleared(),
            event.lines,
            event.combo,
            event.points
        );
        sink.emit(&GridEvent::LinesBlasted(event.clone()));

        let cells = cells_on_lines(grid.topology(), &event.lines);
        let edges = occupied_edges_of(grid, &cells);
        clear_cells(grid, &cells, sink);
        release_edges(grid, &edges);
        downgrade_unbounded_cells(grid, sink);
    }

    if !detect_blastable_lines(grid).is_empty() {
        log::warn!("Blast cascade stopped after {max_waves} waves with lines still complete");
    }
    waves
}

/// Rows whose cells are all complete, then columns likewise
pub fn detect_blastable_lines(grid: &GridState) -> Vec<Line> {
    let topology = grid.topology();
    let (cols, rows) = (topology.cell_columns(), topology.cell_rows());

    let full_rows = (0..rows)
        .filter(|&y| (0..cols).all(|x| grid.is_cell_complete(IVec2::new(x, y))))
        .map(Line::Row);
    let full_columns = (0..cols)
        .filter(|&x| (0..rows).all(|y| grid.is_cell_complete(IVec2::new(x, y))))
        .map(Line::Column);

    full_rows.chain(full_columns).collect()
}

/// Union of the cells on every line, sorted x then y; intersections appear once
pub fn cells_on_lines(topology: &GridTopology, lines: &[Line]) -> Vec<CellPos> {
    let mut cells = Vec::new();
    for line in lines {
        match *line {
            Line::Row(y) => cells.extend((0..topology.cell_columns()).map(|x| IVec2::new(x, y))),
            Line::Column(x) => cells.extend((0..topology.cell_rows()).map(|y| IVec2::new(x, y))),
        }
    }
    cells.sort_unstable_by_key(|c| (c.x, c.y));
    cells.dedup();
    cells
}

/// Occupied bounding edges of the given cells; shared edges appear once
fn occupied_edges_of(grid: &GridState, cells: &[CellPos]) -> BTreeSet<EdgeId> {
    cells
        .iter()
        .filter_map(|&cell| grid.bounding_edges(cell))
        .flatten()
        .filter(|&edge| grid.is_edge_id_occupied(edge))
        .collect()
}

/// Mark cells incomplete and hand their collectibles to the sink
fn clear_cells(grid: &mut GridState, cells: &[CellPos], sink: &mut dyn EventSink) {
    for &pos in cells {
        let Some(cell) = grid.cell_mut(pos) else {
            continue;
        };
        cell.complete = false;
        if let Some(item) = cell.collectible.take() {
            log::debug!("Collected {item} at {pos}");
            sink.emit(&GridEvent::ItemCollected { cell: pos, item });
        }
    }
}

/// Free edges, then release endpoint dots that no longer touch an occupied edge
fn release_edges(grid: &mut GridState, edges: &BTreeSet<EdgeId>) {
    for &edge in edges {
        if let Some(slot) = grid.edge_mut(edge) {
            slot.occupied = false;
        }
    }
    for &edge in edges {
        let (a, b) = edge.endpoints();
        for pos in [a, b] {
            if !grid.has_occupied_neighbor_edge(pos) {
                if let Some(dot) = grid.dot_mut(pos) {
                    dot.occupied = false;
                }
            }
        }
    }
}

/// Demote complete cells that lost a bounding edge to a neighbouring blast
fn downgrade_unbounded_cells(grid: &mut GridState, sink: &mut dyn EventSink) {
    let stale: Vec<CellPos> = grid
        .topology()
        .cells()
        .filter(|&pos| grid.is_cell_complete(pos) && !grid.is_cell_enclosed(pos))
        .collect();
    for pos in stale {
        if let Some(cell) = grid.cell_mut(pos) {
            cell.complete = false;
        }
        log::debug!("Cell {pos} downgraded after neighbouring blast");
        sink.emit(&GridEvent::CellDowngraded { cell: pos });
    }
}
