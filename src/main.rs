//! Stick Blast demo entry point
//!
//! Loads a level (or the built-in one) and lets the greedy player run it.
//!
//! Usage: `stick-blast [level.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use stick_blast::game::{GameEvent, GamePhase, GameState, TickInput, tick};
#[cfg(not(target_arch = "wasm32"))]
use stick_blast::level::LevelDefinition;
#[cfg(not(target_arch = "wasm32"))]
use stick_blast::sim::{Board, EdgeId, GridEvent};

/// Stop a run that neither wins nor loses
#[cfg(not(target_arch = "wasm32"))]
const MAX_AUTOPLAY_TICKS: u32 = 2_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let level = match args.next() {
        Some(path) => match LevelDefinition::load(&path) {
            Ok(level) => level,
            Err(err) => {
                log::error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => LevelDefinition::default_level(),
    };
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(err)) => {
            log::error!("Invalid seed: {err}");
            return ExitCode::FAILURE;
        }
        None => 42,
    };

    let mut state = match GameState::new(Arc::new(level), seed) {
        Ok(state) => state,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let input = TickInput {
        autoplay: true,
        ..Default::default()
    };
    for _ in 0..MAX_AUTOPLAY_TICKS {
        if state.phase != GamePhase::Playing {
            break;
        }
        tick(&mut state, &input);
        for event in state.drain_events() {
            report(&event);
        }
    }

    println!("{}", render_ascii(&state.board));
    log::info!(
        "Finished: {:?} after {} moves, score {}, progress {}",
        state.phase,
        state.moves,
        state.score,
        state.progress_text()
    );
    ExitCode::SUCCESS
}

#[cfg(not(target_arch = "wasm32"))]
fn report(event: &GameEvent) {
    match event {
        GameEvent::Grid(GridEvent::LinesBlasted(blast)) => log::info!(
            "Blast {:?}: +{} (combo x{})",
            blast.lines,
            blast.points,
            blast.combo
        ),
        GameEvent::Grid(GridEvent::ItemCollected { cell, item }) => {
            log::info!("Collected {item} at {cell}")
        }
        GameEvent::Grid(_) => {}
        GameEvent::HandDealt { sticks } => log::info!("Hand: {}", sticks.join(", ")),
        GameEvent::ItemSpawned { cell, item } => log::info!("{item} appeared at {cell}"),
        GameEvent::PlacementRejected { .. }
        | GameEvent::ScoreChanged { .. }
        | GameEvent::PhaseChanged { .. } => {}
    }
}

/// Text view of the board: `o` occupied dot, `#` complete cell, `*` collectible
#[cfg(not(target_arch = "wasm32"))]
fn render_ascii(board: &Board) -> String {
    let grid = board.grid();
    let (w, h) = (board.width(), board.height());
    let mut out = String::new();
    for y in 0..h {
        for x in 0..w {
            let dot = glam::IVec2::new(x, y);
            out.push(if board.is_dot_occupied(dot) { 'o' } else { '.' });
            if x < w - 1 {
                let link = grid.is_edge_id_occupied(EdgeId::vertical(x, y));
                out.push_str(if link { "---" } else { "   " });
            }
        }
        out.push('\n');
        if y < h - 1 {
            for x in 0..w {
                let link = grid.is_edge_id_occupied(EdgeId::horizontal(x, y));
                out.push(if link { '|' } else { ' ' });
                if x < w - 1 {
                    let cell = glam::IVec2::new(x, y);
                    out.push_str(if board.is_cell_complete(cell) {
                        " # "
                    } else if board.collectible_at(cell).is_some() {
                        " * "
                    } else {
                        "   "
                    });
                }
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; hosts drive `tick` themselves
}
