//! Grid topology and the dot/edge/cell aggregate
//!
//! Layout (W = width in dots, H = height in dots):
//! - dots: `W x H`
//! - horizontal edges: `W x (H-1)`, `horizontal[x][y]` links `(x,y)-(x,y+1)`
//! - vertical edges: `(W-1) x H`, `vertical[x][y]` links `(x,y)-(x+1,y)`
//! - cells: `(W-1) x (H-1)`
//!
//! Every accessor is bounds-checked and returns `None` for off-grid slots.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_GRID_DIM, MIN_GRID_DIM};

/// Dot coordinate
pub type DotPos = IVec2;
/// Cell coordinate (lower-left dot of the cell)
pub type CellPos = IVec2;

/// Errors raised when building a grid
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error(
        "grid must be between {min}x{min} and {max}x{max} dots, got {width}x{height}",
        min = MIN_GRID_DIM,
        max = MAX_GRID_DIM
    )]
    InvalidDimensions { width: i32, height: i32 },
    #[error("{array} holds {found} entries, topology needs {expected}")]
    ShapeMismatch {
        array: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Which dense edge array an edge lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Links `(x,y)-(x,y+1)`
    Horizontal,
    /// Links `(x,y)-(x+1,y)`
    Vertical,
}

/// Canonical edge slot: axis plus the minimum endpoint coordinate
///
/// Ordered by axis, then x, then y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId {
    pub axis: Axis,
    pub pos: IVec2,
}

impl EdgeId {
    #[inline]
    fn sort_key(&self) -> (Axis, i32, i32) {
        (self.axis, self.pos.x, self.pos.y)
    }
}

impl Ord for EdgeId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for EdgeId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl EdgeId {
    pub const fn horizontal(x: i32, y: i32) -> Self {
        Self {
            axis: Axis::Horizontal,
            pos: IVec2::new(x, y),
        }
    }

    pub const fn vertical(x: i32, y: i32) -> Self {
        Self {
            axis: Axis::Vertical,
            pos: IVec2::new(x, y),
        }
    }

    /// Both dots joined by this edge, minimum coordinate first
    pub fn endpoints(&self) -> (DotPos, DotPos) {
        match self.axis {
            Axis::Horizontal => (self.pos, self.pos + IVec2::Y),
            Axis::Vertical => (self.pos, self.pos + IVec2::X),
        }
    }
}

/// A grid vertex
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dot {
    /// True iff at least one adjacent edge is occupied
    pub occupied: bool,
}

/// A link between two adjacent dots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub occupied: bool,
}

/// Identifier of a collectible item kind ("gem", "star", ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKind(pub String);

impl ItemKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unit square bounded by four edges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Invariant: `complete` implies all four bounding edges are occupied
    pub complete: bool,
    /// Collectible waiting on this cell (consumed when the cell is blasted)
    #[serde(default)]
    pub collectible: Option<ItemKind>,
}

/// Presentation colours carried with the grid (RGBA, 0xRRGGBBAA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Occupied edges, dots and completed cells
    pub fill: u32,
    /// Empty dots and edges
    pub empty: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fill: 0x00FF_00FF,
            empty: 0x0000_FFFF,
        }
    }
}

/// Dimensions of a dot lattice and the derived array shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TopologyDims")]
pub struct GridTopology {
    width: i32,
    height: i32,
}

/// Unchecked dimensions as they appear in serialized data
#[derive(Deserialize)]
struct TopologyDims {
    width: i32,
    height: i32,
}

impl TryFrom<TopologyDims> for GridTopology {
    type Error = GridError;

    fn try_from(dims: TopologyDims) -> Result<Self, GridError> {
        Self::new(dims.width, dims.height)
    }
}

impl GridTopology {
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        let valid = MIN_GRID_DIM..=MAX_GRID_DIM;
        if !valid.contains(&width) || !valid.contains(&height) {
            return Err(GridError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in dots
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in dots
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Cells per row
    #[inline]
    pub fn cell_columns(&self) -> i32 {
        self.width - 1
    }

    /// Cells per column
    #[inline]
    pub fn cell_rows(&self) -> i32 {
        self.height - 1
    }

    pub fn cell_count(&self) -> usize {
        (self.cell_columns() * self.cell_rows()) as usize
    }

    #[inline]
    pub fn contains_dot(&self, pos: DotPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    #[inline]
    pub fn contains_cell(&self, pos: CellPos) -> bool {
        pos.x >= 0 && pos.x < self.cell_columns() && pos.y >= 0 && pos.y < self.cell_rows()
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        let p = edge.pos;
        match edge.axis {
            Axis::Horizontal => p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height - 1,
            Axis::Vertical => p.x >= 0 && p.x < self.width - 1 && p.y >= 0 && p.y < self.height,
        }
    }

    fn dot_index(&self, pos: DotPos) -> Option<usize> {
        self.contains_dot(pos)
            .then(|| (pos.x * self.height + pos.y) as usize)
    }

    fn cell_index(&self, pos: CellPos) -> Option<usize> {
        self.contains_cell(pos)
            .then(|| (pos.x * self.cell_rows() + pos.y) as usize)
    }

    fn edge_index(&self, edge: EdgeId) -> Option<usize> {
        if !self.contains_edge(edge) {
            return None;
        }
        let p = edge.pos;
        let index = match edge.axis {
            Axis::Horizontal => p.x * (self.height - 1) + p.y,
            Axis::Vertical => p.x * self.height + p.y,
        };
        Some(index as usize)
    }

    /// All cell positions, column-major (x outer, y inner)
    pub fn cells(&self) -> impl Iterator<Item = CellPos> + use<> {
        let (cols, rows) = (self.cell_columns(), self.cell_rows());
        (0..cols).flat_map(move |x| (0..rows).map(move |y| IVec2::new(x, y)))
    }

    /// All edge slots, horizontal array first
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + use<> {
        let (w, h) = (self.width, self.height);
        let horizontal =
            (0..w).flat_map(move |x| (0..h - 1).map(move |y| EdgeId::horizontal(x, y)));
        let vertical =
            (0..w - 1).flat_map(move |x| (0..h).map(move |y| EdgeId::vertical(x, y)));
        horizontal.chain(vertical)
    }
}

/// The grid aggregate: exclusively owns every dot, edge and cell of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridData")]
pub struct GridState {
    topology: GridTopology,
    dots: Vec<Dot>,
    horizontal: Vec<Edge>,
    vertical: Vec<Edge>,
    cells: Vec<Cell>,
    pub theme: Theme,
}

/// Serialized grid before its arrays are checked against the topology
#[derive(Deserialize)]
struct GridData {
    topology: GridTopology,
    dots: Vec<Dot>,
    horizontal: Vec<Edge>,
    vertical: Vec<Edge>,
    cells: Vec<Cell>,
    theme: Theme,
}

impl TryFrom<GridData> for GridState {
    type Error = GridError;

    fn try_from(data: GridData) -> Result<Self, GridError> {
        let empty = Self::with_topology(data.topology, data.theme);
        let shapes = [
            ("dots", empty.dots.len(), data.dots.len()),
            ("horizontal", empty.horizontal.len(), data.horizontal.len()),
            ("vertical", empty.vertical.len(), data.vertical.len()),
            ("cells", empty.cells.len(), data.cells.len()),
        ];
        for (array, expected, found) in shapes {
            if expected != found {
                return Err(GridError::ShapeMismatch {
                    array,
                    expected,
                    found,
                });
            }
        }
        Ok(Self {
            topology: data.topology,
            dots: data.dots,
            horizontal: data.horizontal,
            vertical: data.vertical,
            cells: data.cells,
            theme: data.theme,
        })
    }
}

impl GridState {
    /// Build an empty grid of `width x height` dots
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        let topology = GridTopology::new(width, height)?;
        Ok(Self::with_topology(topology, Theme::default()))
    }

    pub fn with_topology(topology: GridTopology, theme: Theme) -> Self {
        let (w, h) = (topology.width() as usize, topology.height() as usize);
        Self {
            topology,
            dots: vec![Dot::default(); w * h],
            horizontal: vec![Edge::default(); w * (h - 1)],
            vertical: vec![Edge::default(); (w - 1) * h],
            cells: vec![Cell::default(); (w - 1) * (h - 1)],
            theme,
        }
    }

    #[inline]
    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.topology.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.topology.height()
    }

    pub fn dot(&self, pos: DotPos) -> Option<&Dot> {
        self.topology.dot_index(pos).map(|i| &self.dots[i])
    }

    pub fn dot_mut(&mut self, pos: DotPos) -> Option<&mut Dot> {
        self.topology.dot_index(pos).map(|i| &mut self.dots[i])
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&Edge> {
        let index = self.topology.edge_index(edge)?;
        Some(match edge.axis {
            Axis::Horizontal => &self.horizontal[index],
            Axis::Vertical => &self.vertical[index],
        })
    }

    pub fn edge_mut(&mut self, edge: EdgeId) -> Option<&mut Edge> {
        let index = self.topology.edge_index(edge)?;
        Some(match edge.axis {
            Axis::Horizontal => &mut self.horizontal[index],
            Axis::Vertical => &mut self.vertical[index],
        })
    }

    pub fn cell(&self, pos: CellPos) -> Option<&Cell> {
        self.topology.cell_index(pos).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, pos: CellPos) -> Option<&mut Cell> {
        self.topology.cell_index(pos).map(|i| &mut self.cells[i])
    }

    /// Off-grid edges read as unoccupied
    pub fn is_edge_id_occupied(&self, edge: EdgeId) -> bool {
        self.edge(edge).is_some_and(|e| e.occupied)
    }

    pub fn is_dot_occupied(&self, pos: DotPos) -> bool {
        self.dot(pos).is_some_and(|d| d.occupied)
    }

    pub fn is_cell_complete(&self, pos: CellPos) -> bool {
        self.cell(pos).is_some_and(|c| c.complete)
    }

    /// Occupy an edge and both of its endpoint dots. Returns false for off-grid edges.
    pub fn occupy_edge(&mut self, edge: EdgeId) -> bool {
        let Some(slot) = self.edge_mut(edge) else {
            return false;
        };
        slot.occupied = true;
        let (a, b) = edge.endpoints();
        for pos in [a, b] {
            if let Some(dot) = self.dot_mut(pos) {
                dot.occupied = true;
            }
        }
        true
    }

    /// Number of occupied edges on the whole grid
    pub fn occupied_edge_count(&self) -> usize {
        self.horizontal
            .iter()
            .chain(self.vertical.iter())
            .filter(|e| e.occupied)
            .count()
    }

    /// Number of complete cells on the whole grid
    pub fn complete_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.complete).count()
    }

    /// Cells currently holding a collectible
    pub fn collectible_count(&self) -> usize {
        self.cells.iter().filter(|c| c.collectible.is_some()).count()
    }
}
