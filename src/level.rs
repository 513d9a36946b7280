//! Level definitions
//!
//! Loaded from JSON files; every field falls back to the built-in level.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{Board, GridError, GridTopology, ItemKind, StickSegment, StickShape, Theme};

/// Errors that can occur when loading a level
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse level JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("level has no sticks")]
    NoSticks,

    #[error("stick '{name}' has no segments")]
    EmptyStick { name: String },

    #[error("stick '{name}' segment {index} is not a unit axis-aligned segment")]
    InvalidSegment { name: String, index: usize },

    #[error("stick '{name}' segment {index} repeats an earlier segment")]
    DuplicateSegment { name: String, index: usize },

    #[error("hand size {0} outside 1..={max}", max = MAX_HAND_SIZE)]
    HandSize(usize),

    #[error("collect-items win condition has no requirements")]
    NoRequirements,

    #[error("requirement for '{item}' must be at least 1")]
    ZeroRequirement { item: ItemKind },
}

/// A stick shape as written in a level file: `[[x0, y0], [x1, y1]]` per segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickDefinition {
    pub name: String,
    pub segments: Vec<[[i32; 2]; 2]>,
}

impl StickDefinition {
    pub fn new(name: impl Into<String>, segments: &[[[i32; 2]; 2]]) -> Self {
        Self {
            name: name.into(),
            segments: segments.to_vec(),
        }
    }

    fn to_segments(&self) -> impl Iterator<Item = StickSegment> + '_ {
        self.segments
            .iter()
            .map(|&[a, b]| StickSegment::new(IVec2::from_array(a), IVec2::from_array(b)))
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.segments.is_empty() {
            return Err(LevelError::EmptyStick {
                name: self.name.clone(),
            });
        }
        let mut seen = HashSet::new();
        for (index, segment) in self.to_segments().enumerate() {
            if !segment.is_unit() {
                return Err(LevelError::InvalidSegment {
                    name: self.name.clone(),
                    index,
                });
            }
            if !seen.insert(segment.canonical()) {
                return Err(LevelError::DuplicateSegment {
                    name: self.name.clone(),
                    index,
                });
            }
        }
        Ok(())
    }

    pub fn to_shape(&self) -> StickShape {
        StickShape::new(self.name.clone(), self.to_segments().collect())
    }
}

/// Collect `amount` items of one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequirement {
    pub item: ItemKind,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WinCondition {
    /// Reach at least `target` points
    Points { target: u64 },
    /// Collect every listed item kind
    CollectItems { requirements: Vec<ItemRequirement> },
}

impl Default for WinCondition {
    fn default() -> Self {
        WinCondition::Points { target: 500 }
    }
}

/// Collectible spawner tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectibleSettings {
    /// Items spawned when the level starts
    pub initial_spawn_count: usize,
    /// No spawns while this many items are on the board
    pub max_concurrent: usize,
    pub spawn_interval_ticks: u64,
}

impl Default for CollectibleSettings {
    fn default() -> Self {
        Self {
            initial_spawn_count: INITIAL_ITEM_SPAWN_COUNT,
            max_concurrent: MAX_CONCURRENT_ITEMS,
            spawn_interval_ticks: ITEM_SPAWN_INTERVAL_TICKS,
        }
    }
}

/// Everything needed to start a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDefinition {
    pub name: String,
    /// Board width in dots
    pub width: i32,
    /// Board height in dots
    pub height: i32,
    pub theme: Theme,
    pub win_condition: WinCondition,
    /// Shapes the hand is dealt from
    pub sticks: Vec<StickDefinition>,
    pub hand_size: usize,
    pub collectibles: CollectibleSettings,
}

impl Default for LevelDefinition {
    fn default() -> Self {
        Self::default_level()
    }
}

impl LevelDefinition {
    /// Built-in 6x6 points level
    pub fn default_level() -> Self {
        Self {
            name: "Classic".to_string(),
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            theme: Theme::default(),
            win_condition: WinCondition::default(),
            sticks: standard_sticks(),
            hand_size: DEFAULT_HAND_SIZE,
            collectibles: CollectibleSettings::default(),
        }
    }

    /// Read and validate a level file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_json(&json)?;
        log::info!("Loaded level '{}' from {}", level.name, path.display());
        Ok(level)
    }

    /// Parse and validate a level from JSON text
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        GridTopology::new(self.width, self.height)?;
        if self.sticks.is_empty() {
            return Err(LevelError::NoSticks);
        }
        for stick in &self.sticks {
            stick.validate()?;
        }
        if !(1..=MAX_HAND_SIZE).contains(&self.hand_size) {
            return Err(LevelError::HandSize(self.hand_size));
        }
        if let WinCondition::CollectItems { requirements } = &self.win_condition {
            if requirements.is_empty() {
                return Err(LevelError::NoRequirements);
            }
            if let Some(req) = requirements.iter().find(|r| r.amount == 0) {
                return Err(LevelError::ZeroRequirement {
                    item: req.item.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn has_collectibles(&self) -> bool {
        matches!(self.win_condition, WinCondition::CollectItems { .. })
    }

    /// Shared shape templates, in definition order
    pub fn shapes(&self) -> Vec<Arc<StickShape>> {
        self.sticks.iter().map(|s| Arc::new(s.to_shape())).collect()
    }

    pub fn build_board(&self) -> Result<Board, GridError> {
        Board::with_theme(self.width, self.height, self.theme)
    }
}

/// The stock shape catalog
pub fn standard_sticks() -> Vec<StickDefinition> {
    vec![
        StickDefinition::new("I1", &[[[0, 0], [1, 0]]]),
        StickDefinition::new("I2", &[[[0, 0], [1, 0]], [[1, 0], [2, 0]]]),
        StickDefinition::new("I3", &[[[0, 0], [1, 0]], [[1, 0], [2, 0]], [[2, 0], [3, 0]]]),
        StickDefinition::new("L", &[[[0, 0], [1, 0]], [[0, 0], [0, 1]]]),
        StickDefinition::new("U", &[[[0, 0], [0, 1]], [[0, 0], [1, 0]], [[1, 0], [1, 1]]]),
        StickDefinition::new("S", &[[[0, 0], [1, 0]], [[1, 0], [1, 1]], [[1, 1], [2, 1]]]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_is_valid() {
        let level = LevelDefinition::default_level();
        level.validate().unwrap();
        assert!(!level.has_collectibles());
        assert_eq!(level.shapes().len(), level.sticks.len());
        let board = level.build_board().unwrap();
        assert_eq!((board.width(), board.height()), (6, 6));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let level = LevelDefinition::from_json(r#"{ "width": 5, "height": 4 }"#).unwrap();
        assert_eq!((level.width, level.height), (5, 4));
        assert_eq!(level.hand_size, DEFAULT_HAND_SIZE);
        assert_eq!(level.sticks, standard_sticks());
        assert_eq!(level.collectibles, CollectibleSettings::default());
    }

    #[test]
    fn test_collect_items_level() {
        let json = r#"{
            "name": "Gems",
            "win_condition": {
                "type": "collect_items",
                "requirements": [
                    { "item": "gem", "amount": 3 },
                    { "item": "star", "amount": 2 }
                ]
            },
            "sticks": [ { "name": "I1", "segments": [[[0, 0], [1, 0]]] } ],
            "collectibles": { "max_concurrent": 2 }
        }"#;
        let level = LevelDefinition::from_json(json).unwrap();
        assert!(level.has_collectibles());
        assert_eq!(level.collectibles.max_concurrent, 2);
        assert_eq!(level.collectibles.initial_spawn_count, INITIAL_ITEM_SPAWN_COUNT);
        match &level.win_condition {
            WinCondition::CollectItems { requirements } => {
                assert_eq!(requirements[0].item, ItemKind::new("gem"));
                assert_eq!(requirements[1].amount, 2);
            }
            other => panic!("unexpected win condition {other:?}"),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let level = LevelDefinition::default_level();
        let json = level.to_json().unwrap();
        assert_eq!(LevelDefinition::from_json(&json).unwrap(), level);
    }

    #[test]
    fn test_rejects_bad_levels() {
        let bad_dims = LevelDefinition {
            width: 1,
            ..Default::default()
        };
        assert!(matches!(bad_dims.validate(), Err(LevelError::Grid(_))));

        let no_sticks = LevelDefinition {
            sticks: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(no_sticks.validate(), Err(LevelError::NoSticks)));

        let hand = LevelDefinition {
            hand_size: 0,
            ..Default::default()
        };
        assert!(matches!(hand.validate(), Err(LevelError::HandSize(0))));

        let no_reqs = LevelDefinition {
            win_condition: WinCondition::CollectItems {
                requirements: Vec::new(),
            },
            ..Default::default()
        };
        assert!(matches!(no_reqs.validate(), Err(LevelError::NoRequirements)));

        let zero = LevelDefinition {
            win_condition: WinCondition::CollectItems {
                requirements: vec![ItemRequirement {
                    item: ItemKind::new("gem"),
                    amount: 0,
                }],
            },
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(LevelError::ZeroRequirement { .. })));
    }

    #[test]
    fn test_rejects_bad_sticks() {
        let empty = StickDefinition::new("empty", &[]);
        assert!(matches!(empty.validate(), Err(LevelError::EmptyStick { .. })));

        let diagonal = StickDefinition::new("diag", &[[[0, 0], [1, 1]]]);
        assert!(matches!(
            diagonal.validate(),
            Err(LevelError::InvalidSegment { index: 0, .. })
        ));

        let long = StickDefinition::new("long", &[[[0, 0], [1, 0]], [[0, 0], [0, 2]]]);
        assert!(matches!(
            long.validate(),
            Err(LevelError::InvalidSegment { index: 1, .. })
        ));

        let dup = StickDefinition::new("dup", &[[[0, 0], [1, 0]], [[1, 0], [0, 0]]]);
        assert!(matches!(
            dup.validate(),
            Err(LevelError::DuplicateSegment { index: 1, .. })
        ));
    }

    #[test]
    fn test_error_display() {
        let err = LevelError::EmptyStick {
            name: "L".to_string(),
        };
        assert_eq!(err.to_string(), "stick 'L' has no segments");
        assert_eq!(LevelError::HandSize(9).to_string(), "hand size 9 outside 1..=8");
    }

    #[test]
    fn test_load_missing_file() {
        let err = LevelDefinition::load("/nonexistent/level.json").unwrap_err();
        assert!(matches!(err, LevelError::FileRead { .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            LevelDefinition::from_json("{ not json"),
            Err(LevelError::Json(_))
        ));
    }
}
