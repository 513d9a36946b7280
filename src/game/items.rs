//! Collectible spawning for collect-items levels

use std::collections::BTreeMap;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::level::{CollectibleSettings, ItemRequirement, WinCondition};
use crate::sim::{Board, CellPos, ItemKind};

/// Tracks how many of each kind have been put on the board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpawner {
    pub settings: CollectibleSettings,
    /// Items spawned so far per required kind
    spawned: BTreeMap<ItemKind, u32>,
    /// Tick at which the next timed spawn may happen
    next_spawn_tick: u64,
}

fn requirements(condition: &WinCondition) -> &[ItemRequirement] {
    match condition {
        WinCondition::CollectItems { requirements } => requirements,
        WinCondition::Points { .. } => &[],
    }
}

impl ItemSpawner {
    pub fn new(condition: &WinCondition, settings: CollectibleSettings) -> Self {
        Self {
            settings,
            spawned: requirements(condition)
                .iter()
                .map(|r| (r.item.clone(), 0))
                .collect(),
            next_spawn_tick: settings.spawn_interval_ticks,
        }
    }

    pub fn spawned_count(&self, item: &ItemKind) -> u32 {
        self.spawned.get(item).copied().unwrap_or(0)
    }

    /// Kinds that still have items left to spawn, in requirement order
    fn pending<'a>(
        &'a self,
        condition: &'a WinCondition,
    ) -> impl Iterator<Item = &'a ItemKind> + 'a {
        requirements(condition)
            .iter()
            .filter(|r| self.spawned_count(&r.item) < r.amount)
            .map(|r| &r.item)
    }

    pub fn should_spawn_more(&self, board: &Board, condition: &WinCondition) -> bool {
        board.grid().collectible_count() < self.settings.max_concurrent
            && self.pending(condition).next().is_some()
    }

    /// Put a random pending kind on a random free cell
    pub fn spawn_random(
        &mut self,
        board: &mut Board,
        condition: &WinCondition,
        rng: &mut Pcg32,
    ) -> Option<(CellPos, ItemKind)> {
        let kinds: Vec<ItemKind> = self.pending(condition).cloned().collect();
        if kinds.is_empty() {
            return None;
        }
        let cells = board.free_cells();
        if cells.is_empty() {
            log::debug!("No free cell for a collectible");
            return None;
        }

        let item = kinds[rng.random_range(0..kinds.len())].clone();
        let cell = cells[rng.random_range(0..cells.len())];
        if !board.place_collectible(cell, item.clone()) {
            return None;
        }
        *self.spawned.entry(item.clone()).or_insert(0) += 1;
        log::debug!("Spawned {item} at {cell}");
        Some((cell, item))
    }

    /// Initial batch at level start
    pub fn spawn_initial(
        &mut self,
        board: &mut Board,
        condition: &WinCondition,
        rng: &mut Pcg32,
    ) -> Vec<(CellPos, ItemKind)> {
        (0..self.settings.initial_spawn_count)
            .filter_map(|_| self.spawn_random(board, condition, rng))
            .collect()
    }

    /// Timed spawn; call once per tick with the current tick count
    pub fn update(
        &mut self,
        now: u64,
        board: &mut Board,
        condition: &WinCondition,
        rng: &mut Pcg32,
    ) -> Option<(CellPos, ItemKind)> {
        if now < self.next_spawn_tick || !self.should_spawn_more(board, condition) {
            return None;
        }
        self.next_spawn_tick = now + self.settings.spawn_interval_ticks;
        self.spawn_random(board, condition, rng)
    }
}
