//! Placement validation and commit
//!
//! Validation resolves every segment before anything is mutated, so a
//! placement either applies completely or not at all.

use std::collections::BTreeSet;

use glam::IVec2;

use super::blast::{BlastResolver, cells_on_lines};
use super::completion::check_and_complete;
use super::events::{BlastEvent, EventSink, GridEvent, Line};
use super::grid::{CellPos, DotPos, EdgeId, GridState, ItemKind};
use super::stick::Stick;

/// A stick segment mapped onto the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSegment {
    pub start: DotPos,
    pub end: DotPos,
    pub edge: EdgeId,
}

/// Result of a placement attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub accepted: bool,
    pub occupied_edges: Vec<EdgeId>,
    /// Cells completed during the placement, in completion order
    pub completed_cells: Vec<CellPos>,
    pub blast_events: Vec<BlastEvent>,
    pub collected_items: Vec<(CellPos, ItemKind)>,
}

impl PlacementOutcome {
    pub fn rejected() -> Self {
        Self::default()
    }

    /// Total points across every blast wave
    pub fn points(&self) -> u64 {
        self.blast_events
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.points))
    }
}

/// What a placement would do, computed without touching the grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementPreview {
    pub edges: Vec<EdgeId>,
    pub completed_cells: Vec<CellPos>,
    pub blast_lines: Vec<Line>,
    /// Cells on the blasted lines, sorted x then y
    pub blast_cells: Vec<CellPos>,
    pub points: u64,
}

/// Endpoints of a segment for a stick dropped at `origin`
#[inline]
fn resolve_endpoints(origin: IVec2, center: IVec2, start: IVec2, end: IVec2) -> (DotPos, DotPos) {
    (origin + start - center, origin + end - center)
}

/// Map every segment onto a free edge, or `None` if any segment fails
///
/// A segment fails when an endpoint is off the grid, the endpoints are not
/// grid-adjacent, or the edge is already occupied. Sticks without segments,
/// or with two segments on the same edge, never resolve.
pub fn resolve_placement(
    grid: &GridState,
    origin: IVec2,
    stick: &Stick,
) -> Option<Vec<ResolvedSegment>> {
    if stick.segments().is_empty() {
        return None;
    }
    let center = stick.center_offset();
    let resolved: Vec<ResolvedSegment> = stick
        .segments()
        .iter()
        .map(|seg| {
            let (start, end) = resolve_endpoints(origin, center, seg.start, seg.end);
            let edge = grid.connection_between(start, end)?;
            (!grid.is_edge_id_occupied(edge)).then_some(ResolvedSegment { start, end, edge })
        })
        .collect::<Option<_>>()?;
    let distinct: BTreeSet<EdgeId> = resolved.iter().map(|s| s.edge).collect();
    (distinct.len() == resolved.len()).then_some(resolved)
}

pub fn can_place(grid: &GridState, origin: IVec2, stick: &Stick) -> bool {
    resolve_placement(grid, origin, stick).is_some()
}

/// Origins worth scanning for `stick`: its centered bounds clipped to the grid
///
/// Empty when the stick cannot fit inside the grid at all.
pub fn feasible_origins(grid: &GridState, stick: &Stick) -> impl Iterator<Item = IVec2> + use<> {
    let (w, h) = (grid.width(), grid.height());
    let (min, max) = stick
        .centered_bounds()
        .unwrap_or((IVec2::new(w, h), IVec2::new(w, h)));
    let (start_x, end_x) = (0.max(-min.x), (w - 1).min(w - 1 - max.x));
    let (start_y, end_y) = (0.max(-min.y), (h - 1).min(h - 1 - max.y));
    (start_x..=end_x).flat_map(move |x| (start_y..=end_y).map(move |y| IVec2::new(x, y)))
}

/// Whether `stick` fits at any origin (false means the stick is dead)
pub fn can_be_placed_anywhere(grid: &GridState, stick: &Stick) -> bool {
    feasible_origins(grid, stick).any(|origin| can_place(grid, origin, stick))
}

/// Forwards events while collecting the placement outcome
struct Recorder<'a> {
    forward: &'a mut dyn EventSink,
    outcome: &'a mut PlacementOutcome,
}

impl EventSink for Recorder<'_> {
    fn emit(&mut self, event: &GridEvent) {
        match event {
            GridEvent::EdgeOccupied { edge } => self.outcome.occupied_edges.push(*edge),
            GridEvent::CellCompleted { cell } => self.outcome.completed_cells.push(*cell),
            GridEvent::LinesBlasted(blast) => self.outcome.blast_events.push(blast.clone()),
            GridEvent::ItemCollected { cell, item } => {
                self.outcome.collected_items.push((*cell, item.clone()))
            }
            GridEvent::CellDowngraded { .. } => {}
        }
        self.forward.emit(event);
    }
}

/// Validate and apply a placement
///
/// Rejected placements leave the grid untouched. Accepted placements reset
/// the combo, then occupy each segment's edge in order and check the cells
/// on either side of it, which may trigger blasts mid-placement.
pub fn place(
    grid: &mut GridState,
    resolver: &mut BlastResolver,
    origin: IVec2,
    stick: &Stick,
    sink: &mut dyn EventSink,
) -> PlacementOutcome {
    let Some(segments) = resolve_placement(grid, origin, stick) else {
        log::debug!("Rejected {} ({:?}) at {origin}", stick.name(), stick.orientation());
        return PlacementOutcome::rejected();
    };

    resolver.reset_combo();
    let mut outcome = PlacementOutcome {
        accepted: true,
        ..Default::default()
    };
    let mut recorder = Recorder {
        forward: sink,
        outcome: &mut outcome,
    };

    let topology = *grid.topology();
    for segment in &segments {
        grid.occupy_edge(segment.edge);
        recorder.emit(&GridEvent::EdgeOccupied { edge: segment.edge });
        for cell in topology.adjacent_cells(segment.edge) {
            check_and_complete(grid, resolver, cell, &mut recorder);
        }
    }

    log::debug!(
        "Placed {} at {origin}: {} cell(s) completed, {} blast wave(s)",
        stick.name(),
        outcome.completed_cells.len(),
        outcome.blast_events.len()
    );
    outcome
}

/// Run a placement against scratch copies of the grid and resolver
fn dry_run(
    grid: &GridState,
    resolver: &BlastResolver,
    origin: IVec2,
    stick: &Stick,
) -> PlacementOutcome {
    let mut scratch = grid.clone();
    let mut scratch_resolver = resolver.clone();
    place(&mut scratch, &mut scratch_resolver, origin, stick, &mut ())
}

/// Cells a placement at `origin` would complete, without mutating anything
///
/// Identical to `place(..).completed_cells` at the same origin; empty when
/// the placement is illegal.
pub fn simulate_completions(
    grid: &GridState,
    resolver: &BlastResolver,
    origin: IVec2,
    stick: &Stick,
) -> Vec<CellPos> {
    dry_run(grid, resolver, origin, stick).completed_cells
}

/// Full preview for highlighting: edges, completions and blasted cells
pub fn preview_placement(
    grid: &GridState,
    resolver: &BlastResolver,
    origin: IVec2,
    stick: &Stick,
) -> Option<PlacementPreview> {
    let outcome = dry_run(grid, resolver, origin, stick);
    if !outcome.accepted {
        return None;
    }
    let blast_lines: Vec<Line> = outcome
        .blast_events
        .iter()
        .flat_map(|e| e.lines.iter().copied())
        .collect();
    Some(PlacementPreview {
        blast_cells: cells_on_lines(grid.topology(), &blast_lines),
        points: outcome.points(),
        edges: outcome.occupied_edges,
        completed_cells: outcome.completed_cells,
        blast_lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single() -> Stick {
        Stick::from_pairs(&[((0, 0), (1, 0))])
    }

    fn vertical_single() -> Stick {
        Stick::from_pairs(&[((0, 0), (0, 1))])
    }

    fn u_shape() -> Stick {
        Stick::from_pairs(&[((0, 0), (1, 0)), ((1, 0), (1, 1)), ((1, 1), (0, 1))])
    }

    fn square() -> Stick {
        Stick::from_pairs(&[
            ((0, 0), (1, 0)),
            ((1, 0), (1, 1)),
            ((1, 1), (0, 1)),
            ((0, 1), (0, 0)),
        ])
    }

    #[test]
    fn test_resolve_applies_center_offset() {
        let grid = GridState::new(4, 4).unwrap();
        // Square endpoints sum to (4, 4) over 8 points; (0.5, 0.5) rounds to even (0, 0)
        let stick = square();
        assert_eq!(stick.center_offset(), IVec2::ZERO);
        let resolved = resolve_placement(&grid, IVec2::new(1, 1), &stick).unwrap();
        assert_eq!(resolved[0].start, IVec2::new(1, 1));
        assert_eq!(resolved[0].end, IVec2::new(2, 1));
        assert_eq!(resolved[0].edge, EdgeId::vertical(1, 1));
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        let grid = GridState::new(4, 4).unwrap();
        assert!(!can_place(&grid, IVec2::new(3, 0), &single()));
        assert!(!can_place(&grid, IVec2::new(-1, 0), &single()));
        assert!(can_place(&grid, IVec2::new(2, 3), &single()));
        assert!(!can_place(&grid, IVec2::new(2, 3), &vertical_single()));
    }

    #[test]
    fn test_rejects_non_adjacent_segment() {
        let grid = GridState::new(4, 4).unwrap();
        let diagonal = Stick::from_pairs(&[((0, 0), (1, 1))]);
        let long = Stick::from_pairs(&[((0, 0), (2, 0))]);
        assert!(!can_place(&grid, IVec2::new(1, 1), &diagonal));
        assert!(!can_place(&grid, IVec2::new(1, 1), &long));
        assert!(!can_place(&grid, IVec2::new(1, 1), &Stick::from_pairs(&[])));
        let doubled = Stick::from_pairs(&[((0, 0), (1, 0)), ((1, 0), (0, 0))]);
        assert!(!can_place(&grid, IVec2::new(1, 1), &doubled));
    }

    #[test]
    fn test_rejects_occupied_edge_atomically() {
        let mut grid = GridState::new(4, 4).unwrap();
        let mut resolver = BlastResolver::new();
        let first = place(&mut grid, &mut resolver, IVec2::new(1, 1), &vertical_single(), &mut ());
        assert!(first.accepted);
        let before = grid.clone();

        // Only the square's last side (1,2)-(1,1) collides
        let overlapping = place(&mut grid, &mut resolver, IVec2::new(1, 1), &square(), &mut ());
        assert!(!overlapping.accepted);
        assert_eq!(overlapping, PlacementOutcome::rejected());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_square_completes_one_cell() {
        let mut grid = GridState::new(4, 4).unwrap();
        let mut resolver = BlastResolver::new();
        let mut events: Vec<GridEvent> = Vec::new();
        let outcome = place(&mut grid, &mut resolver, IVec2::new(1, 1), &square(), &mut events);

        assert!(outcome.accepted);
        assert_eq!(outcome.occupied_edges.len(), 4);
        assert_eq!(outcome.completed_cells, vec![IVec2::new(1, 1)]);
        assert!(outcome.blast_events.is_empty());
        assert!(grid.is_cell_complete(IVec2::new(1, 1)));
        assert_eq!(
            events.iter().filter(|e| matches!(e, GridEvent::EdgeOccupied { .. })).count(),
            4
        );
        for dot in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            assert!(grid.is_dot_occupied(IVec2::new(dot.0, dot.1)));
        }
    }

    #[test]
    fn test_simulation_matches_and_does_not_mutate() {
        let mut grid = GridState::new(4, 4).unwrap();
        let mut resolver = BlastResolver::new();
        let before = grid.clone();

        let simulated = simulate_completions(&grid, &resolver, IVec2::new(1, 1), &square());
        assert_eq!(grid, before);
        let placed = place(&mut grid, &mut resolver, IVec2::new(1, 1), &square(), &mut ());
        assert_eq!(simulated, placed.completed_cells);

        // Illegal placements simulate to nothing
        assert!(simulate_completions(&grid, &resolver, IVec2::new(1, 1), &square()).is_empty());
    }

    #[test]
    fn test_preview_reports_blast() {
        // 3x3 dots; complete (0,0) with a square, then close (1,0) with a U
        let mut grid = GridState::new(3, 3).unwrap();
        let mut resolver = BlastResolver::new();
        place(&mut grid, &mut resolver, IVec2::ZERO, &square(), &mut ());
        assert!(grid.is_cell_complete(IVec2::ZERO));

        // U center offset is (1, 0), so origin (2,0) puts its first side on (1,0)-(2,0)
        assert_eq!(u_shape().center_offset(), IVec2::new(1, 0));
        let preview = preview_placement(&grid, &resolver, IVec2::new(2, 0), &u_shape()).unwrap();
        assert_eq!(preview.completed_cells, vec![IVec2::new(1, 0)]);
        assert_eq!(preview.blast_lines, vec![Line::Row(0)]);
        assert_eq!(preview.blast_cells, vec![IVec2::new(0, 0), IVec2::new(1, 0)]);
        assert_eq!(preview.points, 20);
        assert_eq!(preview.edges.len(), 3);
        assert!(grid.is_cell_complete(IVec2::ZERO));

        assert!(preview_placement(&grid, &resolver, IVec2::ZERO, &square()).is_none());
    }

    #[test]
    fn test_can_be_placed_anywhere() {
        let mut grid = GridState::new(3, 3).unwrap();
        assert!(can_be_placed_anywhere(&grid, &square()));

        let too_long =
            Stick::from_pairs(&[((0, 0), (1, 0)), ((1, 0), (2, 0)), ((2, 0), (3, 0))]);
        assert!(!can_be_placed_anywhere(&grid, &too_long));
        assert_eq!(feasible_origins(&grid, &too_long).count(), 0);

        // Fill every edge except one single vertical link
        let topology = *grid.topology();
        let keep = EdgeId::horizontal(2, 1);
        for edge in topology.edges().filter(|&e| e != keep) {
            grid.occupy_edge(edge);
        }
        assert!(!can_be_placed_anywhere(&grid, &single()));
        assert!(can_be_placed_anywhere(&grid, &vertical_single()));
        assert!(!can_be_placed_anywhere(&grid, &square()));
    }
}
