//! Board: the grid plus its blast state, behind the operations hosts call

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::blast::BlastResolver;
use super::events::EventSink;
use super::grid::{CellPos, DotPos, GridError, GridState, GridTopology, ItemKind, Theme};
use super::placement::{self, PlacementOutcome, PlacementPreview};
use super::stick::Stick;

/// One level's playing field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    grid: GridState,
    resolver: BlastResolver,
}

impl Board {
    /// Fresh board of `width x height` dots with every dot, edge and cell empty
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        Self::with_theme(width, height, Theme::default())
    }

    pub fn with_theme(width: i32, height: i32, theme: Theme) -> Result<Self, GridError> {
        let topology = GridTopology::new(width, height)?;
        Ok(Self {
            grid: GridState::with_topology(topology, theme),
            resolver: BlastResolver::new(),
        })
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    /// Successive blast waves since the last accepted placement
    pub fn combo(&self) -> u32 {
        self.resolver.combo()
    }

    pub fn can_place_stick(&self, origin: IVec2, stick: &Stick) -> bool {
        placement::can_place(&self.grid, origin, stick)
    }

    /// Place a stick, resolving completions and blasts before returning
    pub fn place_stick(
        &mut self,
        origin: IVec2,
        stick: &Stick,
        sink: &mut dyn EventSink,
    ) -> PlacementOutcome {
        placement::place(&mut self.grid, &mut self.resolver, origin, stick, sink)
    }

    /// Cells `place_stick` would complete at `origin`, leaving the board untouched
    pub fn simulate_completions(&self, origin: IVec2, stick: &Stick) -> Vec<CellPos> {
        placement::simulate_completions(&self.grid, &self.resolver, origin, stick)
    }

    /// Highlight data for a hovered placement, `None` when illegal
    pub fn preview_placement(&self, origin: IVec2, stick: &Stick) -> Option<PlacementPreview> {
        placement::preview_placement(&self.grid, &self.resolver, origin, stick)
    }

    pub fn can_stick_be_placed_anywhere(&self, stick: &Stick) -> bool {
        placement::can_be_placed_anywhere(&self.grid, stick)
    }

    /// Every origin where `stick` fits, in scan order
    pub fn legal_origins<'a>(&'a self, stick: &'a Stick) -> impl Iterator<Item = IVec2> + 'a {
        placement::feasible_origins(&self.grid, stick)
            .filter(move |&origin| placement::can_place(&self.grid, origin, stick))
    }

    /// False for non-adjacent or off-grid dot pairs
    pub fn is_edge_occupied(&self, a: DotPos, b: DotPos) -> bool {
        self.grid
            .connection_between(a, b)
            .is_some_and(|edge| self.grid.is_edge_id_occupied(edge))
    }

    pub fn is_cell_complete(&self, pos: CellPos) -> bool {
        self.grid.is_cell_complete(pos)
    }

    pub fn is_dot_occupied(&self, pos: DotPos) -> bool {
        self.grid.is_dot_occupied(pos)
    }

    pub fn completed_count_in_row(&self, y: i32) -> usize {
        self.grid.completed_count_in_row(y)
    }

    pub fn completed_count_in_column(&self, x: i32) -> usize {
        self.grid.completed_count_in_column(x)
    }

    pub fn collectible_at(&self, pos: CellPos) -> Option<&ItemKind> {
        self.grid.cell(pos).and_then(|c| c.collectible.as_ref())
    }

    /// Attach a collectible to an empty, incomplete cell
    pub fn place_collectible(&mut self, pos: CellPos, item: ItemKind) -> bool {
        match self.grid.cell_mut(pos) {
            Some(cell) if !cell.complete && cell.collectible.is_none() => {
                cell.collectible = Some(item);
                true
            }
            _ => false,
        }
    }

    /// Cells that may receive a collectible
    pub fn free_cells(&self) -> Vec<CellPos> {
        self.grid
            .topology()
            .cells()
            .filter(|&pos| {
                self.grid
                    .cell(pos)
                    .is_some_and(|c| !c.complete && c.collectible.is_none())
            })
            .collect()
    }
}
