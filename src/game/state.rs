//! Game session state
//!
//! Everything a host needs to run one level: the board, the hand of sticks
//! on offer, score and win progress. Randomness comes from a seeded PCG so a
//! run replays exactly from `(level, seed)`.

use std::sync::Arc;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::items::ItemSpawner;
use super::win::WinProgress;
use crate::level::{LevelDefinition, LevelError};
use crate::sim::{Board, CellPos, GridEvent, ItemKind, Orientation, Stick, StickShape};

/// Game phase state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Accepting placements
    #[default]
    Playing,
    /// Win condition met
    Won,
    /// No stick in hand fits anywhere
    Lost,
}

/// Why a place command was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    NotPlaying,
    NoSuchSlot,
    EmptySlot,
    Illegal,
}

/// Events for the presentation layer, drained by the host after each tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Grid(GridEvent),
    PlacementRejected {
        slot: usize,
        origin: IVec2,
        reason: RejectReason,
    },
    /// New hand, by shape name
    HandDealt { sticks: Vec<String> },
    ItemSpawned { cell: CellPos, item: ItemKind },
    ScoreChanged { score: u64 },
    PhaseChanged { phase: GamePhase },
}

/// One level in progress
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub level: Arc<LevelDefinition>,
    pub board: Board,
    pub phase: GamePhase,
    pub score: u64,
    /// Sticks on offer; `None` once a slot's stick has been placed
    pub hand: Vec<Option<Stick>>,
    pub progress: WinProgress,
    pub items: ItemSpawner,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Pending events since the host last drained them
    pub events: Vec<GameEvent>,
    /// Placements accepted this run
    pub moves: u32,
    shapes: Vec<Arc<StickShape>>,
    rng: Pcg32,
}

impl GameState {
    /// Start a level with the given seed
    pub fn new(level: Arc<LevelDefinition>, seed: u64) -> Result<Self, LevelError> {
        level.validate()?;
        let mut state = Self {
            seed,
            board: level.build_board()?,
            phase: GamePhase::Playing,
            score: 0,
            hand: Vec::new(),
            progress: WinProgress::new(&level.win_condition),
            items: ItemSpawner::new(&level.win_condition, level.collectibles),
            time_ticks: 0,
            events: Vec::new(),
            moves: 0,
            shapes: level.shapes(),
            rng: Pcg32::seed_from_u64(seed),
            level,
        };

        if state.level.has_collectibles() {
            let spawned = state.items.spawn_initial(
                &mut state.board,
                &state.level.win_condition,
                &mut state.rng,
            );
            for (cell, item) in spawned {
                state.events.push(GameEvent::ItemSpawned { cell, item });
            }
        }
        state.deal_hand();

        log::info!(
            "Level '{}' started ({}x{}, seed {})",
            state.level.name,
            state.board.width(),
            state.board.height(),
            seed
        );
        Ok(state)
    }

    /// Random shape in a random orientation
    fn random_stick(&mut self) -> Option<Stick> {
        if self.shapes.is_empty() {
            return None;
        }
        let shape = self.shapes[self.rng.random_range(0..self.shapes.len())].clone();
        let orientation = Orientation::ALL[self.rng.random_range(0..Orientation::ALL.len())];
        Some(Stick::new(shape, orientation))
    }

    /// Fill every slot with a fresh stick
    pub fn deal_hand(&mut self) {
        let hand: Vec<Option<Stick>> = (0..self.level.hand_size)
            .map(|_| self.random_stick())
            .collect();
        let sticks: Vec<String> = hand.iter().flatten().map(|s| s.name().to_string()).collect();
        self.hand = hand;
        log::debug!("Dealt {:?}", sticks);
        self.events.push(GameEvent::HandDealt { sticks });
    }

    pub fn hand_is_empty(&self) -> bool {
        self.hand.iter().all(Option::is_none)
    }

    /// Sticks still in hand with their slot index
    pub fn sticks_in_hand(&self) -> impl Iterator<Item = (usize, &Stick)> {
        self.hand
            .iter()
            .enumerate()
            .filter_map(|(slot, stick)| stick.as_ref().map(|s| (slot, s)))
    }

    /// True when no stick in hand fits anywhere on the board
    pub fn is_out_of_moves(&self) -> bool {
        !self
            .sticks_in_hand()
            .any(|(_, stick)| self.board.can_stick_be_placed_anywhere(stick))
    }

    pub fn progress_text(&self) -> String {
        self.progress.progress_text(&self.level.win_condition)
    }

    /// Take pending events, leaving the queue empty
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Timed collectible spawn for the current tick
    pub(crate) fn update_items(&mut self) {
        if !self.level.has_collectibles() {
            return;
        }
        let Self {
            items,
            board,
            level,
            rng,
            events,
            time_ticks,
            ..
        } = self;
        if let Some((cell, item)) = items.update(*time_ticks, board, &level.win_condition, rng) {
            events.push(GameEvent::ItemSpawned { cell, item });
        }
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        if self.phase == phase {
            return;
        }
        log::info!(
            "Phase {:?} -> {:?} (score {}, {})",
            self.phase,
            phase,
            self.score,
            self.progress_text()
        );
        self.phase = phase;
        self.events.push(GameEvent::PhaseChanged { phase });
    }
}
