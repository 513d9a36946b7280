//! Win condition progress

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::level::WinCondition;
use crate::sim::ItemKind;

/// Running totals checked against the level's win condition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinProgress {
    pub points: u64,
    /// Collected count per required item kind (kinds not required are ignored)
    pub collected: BTreeMap<ItemKind, u32>,
}

impl WinProgress {
    /// Zeroed progress for a condition
    pub fn new(condition: &WinCondition) -> Self {
        let collected = match condition {
            WinCondition::Points { .. } => BTreeMap::new(),
            WinCondition::CollectItems { requirements } => requirements
                .iter()
                .map(|r| (r.item.clone(), 0))
                .collect(),
        };
        Self {
            points: 0,
            collected,
        }
    }

    pub fn add_points(&mut self, points: u64) {
        self.points = self.points.saturating_add(points);
    }

    /// Count an item; returns false for kinds the level does not ask for
    pub fn collect(&mut self, item: &ItemKind) -> bool {
        match self.collected.get_mut(item) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }

    pub fn collected_count(&self, item: &ItemKind) -> u32 {
        self.collected.get(item).copied().unwrap_or(0)
    }

    pub fn is_met(&self, condition: &WinCondition) -> bool {
        match condition {
            WinCondition::Points { target } => self.points >= *target,
            WinCondition::CollectItems { requirements } => requirements
                .iter()
                .all(|r| self.collected_count(&r.item) >= r.amount),
        }
    }

    /// HUD text: `"120/500"` or `"gem: 1/3, star: 0/2"`
    pub fn progress_text(&self, condition: &WinCondition) -> String {
        match condition {
            WinCondition::Points { target } => format!("{}/{}", self.points, target),
            WinCondition::CollectItems { requirements } => requirements
                .iter()
                .map(|r| format!("{}: {}/{}", r.item, self.collected_count(&r.item), r.amount))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
