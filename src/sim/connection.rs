//! Connection index: coordinate pairs to edge slots, cells to bounding edges

use glam::IVec2;

use super::grid::{Axis, CellPos, DotPos, EdgeId, GridState, GridTopology};

impl GridTopology {
    /// Edge slot between two grid-adjacent dots
    ///
    /// Returns `None` unless both dots are in bounds and exactly one step
    /// apart along a single axis.
    pub fn connection_between(&self, a: DotPos, b: DotPos) -> Option<EdgeId> {
        if !self.contains_dot(a) || !self.contains_dot(b) {
            return None;
        }
        let delta = (a - b).abs();
        let min = a.min(b);
        match (delta.x, delta.y) {
            (0, 1) => Some(EdgeId::horizontal(min.x, min.y)),
            (1, 0) => Some(EdgeId::vertical(min.x, min.y)),
            _ => None,
        }
    }

    /// The four edges bounding a cell, ordered `[west, east, south, north]`
    ///
    /// West and east are the `vertical` links at `y` and `y + 1`, south and
    /// north the `horizontal` links at `x` and `x + 1`.
    pub fn bounding_edges(&self, cell: CellPos) -> Option<[EdgeId; 4]> {
        if !self.contains_cell(cell) {
            return None;
        }
        let (x, y) = (cell.x, cell.y);
        Some([
            EdgeId::vertical(x, y),
            EdgeId::vertical(x, y + 1),
            EdgeId::horizontal(x, y),
            EdgeId::horizontal(x + 1, y),
        ])
    }

    /// Cells straddling an edge, clipped to the valid cell range (0 to 2 cells)
    pub fn adjacent_cells(&self, edge: EdgeId) -> impl Iterator<Item = CellPos> + use<> {
        let p = edge.pos;
        let candidates = match edge.axis {
            Axis::Horizontal => [IVec2::new(p.x - 1, p.y), IVec2::new(p.x, p.y)],
            Axis::Vertical => [IVec2::new(p.x, p.y - 1), IVec2::new(p.x, p.y)],
        };
        let topology = *self;
        candidates
            .into_iter()
            .filter(move |&cell| topology.contains_cell(cell))
    }

    /// Edges touching a dot (fewer than four on the border)
    pub fn dot_edges(&self, dot: DotPos) -> impl Iterator<Item = EdgeId> + use<> {
        let (x, y) = (dot.x, dot.y);
        let candidates = [
            EdgeId::vertical(x - 1, y),
            EdgeId::vertical(x, y),
            EdgeId::horizontal(x, y - 1),
            EdgeId::horizontal(x, y),
        ];
        let topology = *self;
        let on_grid = topology.contains_dot(dot);
        candidates
            .into_iter()
            .filter(move |&edge| on_grid && topology.contains_edge(edge))
    }
}

impl GridState {
    /// Edge between two dots, `None` when they are not grid-adjacent
    pub fn connection_between(&self, a: DotPos, b: DotPos) -> Option<EdgeId> {
        self.topology().connection_between(a, b)
    }

    pub fn bounding_edges(&self, cell: CellPos) -> Option<[EdgeId; 4]> {
        self.topology().bounding_edges(cell)
    }

    /// Whether a dot still touches at least one occupied edge
    pub fn has_occupied_neighbor_edge(&self, dot: DotPos) -> bool {
        self.topology()
            .dot_edges(dot)
            .any(|edge| self.is_edge_id_occupied(edge))
    }

    /// Whether all four bounding edges of a cell are occupied
    pub fn is_cell_enclosed(&self, cell: CellPos) -> bool {
        self.bounding_edges(cell)
            .is_some_and(|edges| edges.iter().all(|&e| self.is_edge_id_occupied(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridState {
        GridState::new(4, 4).unwrap()
    }

    #[test]
    fn test_connection_between_is_direction_agnostic() {
        let grid = grid();
        let a = IVec2::new(1, 1);
        assert_eq!(
            grid.connection_between(a, IVec2::new(1, 2)),
            Some(EdgeId::horizontal(1, 1))
        );
        assert_eq!(
            grid.connection_between(IVec2::new(1, 2), a),
            Some(EdgeId::horizontal(1, 1))
        );
        assert_eq!(
            grid.connection_between(IVec2::new(2, 1), a),
            Some(EdgeId::vertical(1, 1))
        );
    }

    #[test]
    fn test_connection_between_rejects_non_adjacent() {
        let grid = grid();
        let a = IVec2::new(1, 1);
        assert_eq!(grid.connection_between(a, a), None);
        assert_eq!(grid.connection_between(a, IVec2::new(2, 2)), None);
        assert_eq!(grid.connection_between(a, IVec2::new(1, 3)), None);
        assert_eq!(
            grid.connection_between(IVec2::new(3, 0), IVec2::new(4, 0)),
            None
        );
        assert_eq!(
            grid.connection_between(IVec2::new(0, -1), IVec2::new(0, 0)),
            None
        );
    }

    #[test]
    fn test_bounding_edges_layout() {
        let grid = grid();
        let edges = grid.bounding_edges(IVec2::new(1, 2)).unwrap();
        assert_eq!(
            edges,
            [
                EdgeId::vertical(1, 2),
                EdgeId::vertical(1, 3),
                EdgeId::horizontal(1, 2),
                EdgeId::horizontal(2, 2),
            ]
        );
        assert!(grid.bounding_edges(IVec2::new(3, 0)).is_none());
        assert!(grid.bounding_edges(IVec2::new(0, -1)).is_none());
    }

    #[test]
    fn test_every_cell_edge_is_on_grid() {
        let grid = grid();
        for cell in grid.topology().cells() {
            for edge in grid.bounding_edges(cell).unwrap() {
                assert!(grid.topology().contains_edge(edge), "{cell} {edge:?}");
            }
        }
    }

    #[test]
    fn test_adjacent_cells_agree_with_bounding_edges() {
        let grid = grid();
        let topology = *grid.topology();
        for edge in topology.edges() {
            for cell in topology.adjacent_cells(edge) {
                assert!(topology.bounding_edges(cell).unwrap().contains(&edge));
            }
        }
        for cell in topology.cells() {
            for edge in topology.bounding_edges(cell).unwrap() {
                assert!(topology.adjacent_cells(edge).any(|c| c == cell));
            }
        }
    }

    #[test]
    fn test_border_edges_have_one_cell() {
        let topology = *grid().topology();
        assert_eq!(topology.adjacent_cells(EdgeId::horizontal(0, 0)).count(), 1);
        assert_eq!(topology.adjacent_cells(EdgeId::horizontal(3, 1)).count(), 1);
        assert_eq!(topology.adjacent_cells(EdgeId::vertical(1, 0)).count(), 1);
        assert_eq!(topology.adjacent_cells(EdgeId::vertical(1, 3)).count(), 1);
        assert_eq!(topology.adjacent_cells(EdgeId::vertical(1, 1)).count(), 2);
    }

    #[test]
    fn test_dot_edges_bounds_checked() {
        let topology = *grid().topology();
        assert_eq!(topology.dot_edges(IVec2::new(0, 0)).count(), 2);
        assert_eq!(topology.dot_edges(IVec2::new(0, 1)).count(), 3);
        assert_eq!(topology.dot_edges(IVec2::new(1, 1)).count(), 4);
        assert_eq!(topology.dot_edges(IVec2::new(4, 4)).count(), 0);
    }

    #[test]
    fn test_has_occupied_neighbor_edge() {
        let mut grid = grid();
        let corner = IVec2::new(3, 3);
        assert!(!grid.has_occupied_neighbor_edge(corner));
        grid.occupy_edge(EdgeId::vertical(2, 3));
        assert!(grid.has_occupied_neighbor_edge(corner));
        assert!(grid.has_occupied_neighbor_edge(IVec2::new(2, 3)));
        assert!(!grid.has_occupied_neighbor_edge(IVec2::new(3, 2)));
    }
}
