//! Session tick
//!
//! Advances the session by one step and applies at most one placement.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase, GameState, RejectReason};
use crate::sim::GridEvent;

/// Place the stick in `slot` centered at `origin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceCommand {
    pub slot: usize,
    pub origin: IVec2,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Drop a stick from the hand onto the board
    pub place: Option<PlaceCommand>,
    /// Restart the level with the next seed
    pub restart: bool,
    /// Let the built-in player pick a move when `place` is empty
    pub autoplay: bool,
}

/// Advance the session by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.restart {
        restart(state);
        return;
    }

    if state.phase != GamePhase::Playing {
        if let Some(command) = input.place {
            reject(state, command, RejectReason::NotPlaying);
        }
        return;
    }

    state.time_ticks += 1;
    state.update_items();

    let command = match input.place {
        Some(command) => Some(command),
        None if input.autoplay => best_move(state),
        None => None,
    };
    if let Some(command) = command {
        apply_placement(state, command);
    }
}

fn restart(state: &mut GameState) {
    let seed = state.seed.wrapping_add(1);
    match GameState::new(state.level.clone(), seed) {
        Ok(fresh) => *state = fresh,
        Err(err) => log::warn!("Restart failed: {err}"),
    }
}

fn reject(state: &mut GameState, command: PlaceCommand, reason: RejectReason) {
    log::warn!(
        "Rejected placement of slot {} at {}: {:?}",
        command.slot,
        command.origin,
        reason
    );
    state.events.push(GameEvent::PlacementRejected {
        slot: command.slot,
        origin: command.origin,
        reason,
    });
}

fn apply_placement(state: &mut GameState, command: PlaceCommand) {
    let stick = match state.hand.get(command.slot) {
        Some(Some(stick)) => stick.clone(),
        Some(None) => return reject(state, command, RejectReason::EmptySlot),
        None => return reject(state, command, RejectReason::NoSuchSlot),
    };

    let mut grid_events: Vec<GridEvent> = Vec::new();
    let outcome = state.board.place_stick(command.origin, &stick, &mut grid_events);
    if !outcome.accepted {
        return reject(state, command, RejectReason::Illegal);
    }

    state.hand[command.slot] = None;
    state.moves += 1;
    state.events.extend(grid_events.into_iter().map(GameEvent::Grid));

    for (_, item) in &outcome.collected_items {
        state.progress.collect(item);
    }
    let points = outcome.points();
    if points > 0 {
        state.score = state.score.saturating_add(points);
        state.progress.add_points(points);
        state.events.push(GameEvent::ScoreChanged { score: state.score });
        log::debug!("+{points} (combo {}), score {}", state.board.combo(), state.score);
    }

    if state.hand_is_empty() {
        state.deal_hand();
    }

    if state.progress.is_met(&state.level.win_condition) {
        state.set_phase(GamePhase::Won);
    } else if state.is_out_of_moves() {
        state.set_phase(GamePhase::Lost);
    }
}

/// Greedy choice: most cells completed, then most points, first in scan order
pub fn best_move(state: &GameState) -> Option<PlaceCommand> {
    let mut best: Option<((usize, u64), PlaceCommand)> = None;
    for (slot, stick) in state.sticks_in_hand() {
        for origin in state.board.legal_origins(stick) {
            let Some(preview) = state.board.preview_placement(origin, stick) else {
                continue;
            };
            let key = (preview.completed_cells.len(), preview.points);
            if best.as_ref().is_none_or(|(k, _)| key > *k) {
                best = Some((key, PlaceCommand { slot, origin }));
            }
        }
    }
    best.map(|(_, command)| command)
}
