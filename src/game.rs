use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cozy_chess::Color;
use indicatif::ProgressBar;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::Agent;
use crate::board::{Position, PositionError};
use crate::engine::{EngineError, UciEngine};

/// Fivefold repetition ends the game outright; threefold is claimable.
const FIVEFOLD: usize = 5;
const THREEFOLD: usize = 3;
/// Halfmove clock at which the 50-move draw becomes claimable.
const FIFTY_MOVE_CLOCK: u8 = 100;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Position(#[from] PositionError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{name} returned no move in a non-terminal position")]
    NoMove { name: String },
    #[error("{name} returned illegal move {uci:?}")]
    IllegalMove { name: String, uci: String },
}

/// Game side, a serializable mirror of the oracle's color type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

/// Closed set of ways a game ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Checkmate { winner: Side },
    Stalemate,
    FivefoldRepetition,
    InsufficientMaterial,
    ClaimedDraw,
    Interrupted,
}

impl Outcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Outcome::Stalemate
                | Outcome::FivefoldRepetition
                | Outcome::InsufficientMaterial
                | Outcome::ClaimedDraw
        )
    }

    /// Human-readable result line.
    pub fn message(&self) -> String {
        match self {
            Outcome::Checkmate { winner } => format!("checkmate: {winner} wins!"),
            Outcome::Stalemate => "draw: stalemate".to_string(),
            Outcome::FivefoldRepetition => "draw: 5-fold repetition".to_string(),
            Outcome::InsufficientMaterial => "draw: insufficient material".to_string(),
            Outcome::ClaimedDraw => "draw: claim".to_string(),
            Outcome::Interrupted => "Game interrupted!".to_string(),
        }
    }
}

/// End-of-game check against the current position and the hash history.
/// Draws that are merely claimable are claimed automatically.
pub fn game_over(pos: &Position, history: &[u64]) -> Option<Outcome> {
    if pos.is_checkmate() {
        return Some(Outcome::Checkmate { winner: Side::from(!pos.side_to_move()) });
    }
    if pos.is_stalemate() {
        return Some(Outcome::Stalemate);
    }
    let repetitions = history.iter().filter(|&&h| h == pos.hash()).count();
    if repetitions >= FIVEFOLD {
        return Some(Outcome::FivefoldRepetition);
    }
    if pos.is_insufficient_material() {
        return Some(Outcome::InsufficientMaterial);
    }
    if pos.halfmove_clock() >= FIFTY_MOVE_CLOCK || repetitions >= THREEFOLD {
        return Some(Outcome::ClaimedDraw);
    }
    None
}

/// Shared cancellation flag, checked between plies.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A player in a match: an in-process agent or an external UCI engine.
pub enum Seat {
    Agent(Agent),
    Engine { engine: UciEngine, movetime: Duration },
}

impl Seat {
    pub fn name(&self) -> String {
        match self {
            Seat::Agent(agent) => agent.name().to_string(),
            Seat::Engine { engine, .. } => engine.name().to_string(),
        }
    }

    pub fn search_depth(&self) -> Option<u32> {
        match self {
            Seat::Agent(agent) => agent.search_depth(),
            Seat::Engine { .. } => None,
        }
    }

    fn pick(&mut self, pos: &Position) -> Result<Option<String>, MatchError> {
        match self {
            Seat::Agent(agent) => Ok(agent.choose_move(pos)),
            Seat::Engine { engine, movetime } => {
                Ok(Some(engine.best_move(&pos.fen(), *movetime)?))
            }
        }
    }

    fn reset(&mut self) -> Result<(), MatchError> {
        if let Seat::Engine { engine, .. } = self {
            engine.new_game()?;
        }
        Ok(())
    }
}

/// Per-move board printing for interactive watching.
#[derive(Clone, Debug, Default)]
pub struct DisplayOpts {
    pub show_board: bool,
    pub pause: Option<Duration>,
}

#[derive(Debug)]
pub struct GameReport {
    pub outcome: Outcome,
    pub final_position: Position,
    pub moves_played: u32,
}

/// Play one game between two seats from `start`. Cancellation yields the
/// interrupted outcome with the last completed position intact.
pub fn play_game(
    white: &mut Seat,
    black: &mut Seat,
    start: &Position,
    display: &DisplayOpts,
    cancel: &CancelToken,
) -> Result<GameReport, MatchError> {
    let mut pos = start.clone();
    let mut history = vec![pos.hash()];
    let mut moves_played = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Ok(GameReport { outcome: Outcome::Interrupted, final_position: pos, moves_played });
        }
        if let Some(outcome) = game_over(&pos, &history) {
            return Ok(GameReport { outcome, final_position: pos, moves_played });
        }

        let side = pos.side_to_move();
        let seat = match side {
            Color::White => &mut *white,
            Color::Black => &mut *black,
        };
        let name = seat.name();
        let uci = seat
            .pick(&pos)?
            .ok_or_else(|| MatchError::NoMove { name: name.clone() })?;
        let mv = pos
            .find_uci(&uci)
            .ok_or_else(|| MatchError::IllegalMove { name, uci: uci.clone() })?;
        pos = pos.apply(mv);
        history.push(pos.hash());
        moves_played += 1;

        if display.show_board {
            println!("move {moves_played}: {} plays {uci}", Side::from(side));
            println!("{}", pos.ascii());
            if let Some(pause) = display.pause {
                std::thread::sleep(pause);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct MatchSettings {
    pub rounds: u32,
    pub start_fen: Option<String>,
    pub display: DisplayOpts,
}

/// One row of match statistics per finished game.
#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub round: u32,
    pub rounds_total: u32,
    pub depth: Option<u32>,
    pub white: String,
    pub black: String,
    pub outcome: Outcome,
    pub message: String,
    pub moves_played: u32,
    pub white_pieces: u32,
    pub black_pieces: u32,
    pub total_pieces: u32,
}

/// Play `rounds` games between fixed seats. Cancellation ends the whole
/// match; the interrupted game still gets a summary row.
pub fn run_match(
    white: &mut Seat,
    black: &mut Seat,
    settings: &MatchSettings,
    cancel: &CancelToken,
) -> Result<Vec<GameSummary>, MatchError> {
    let start = match settings.start_fen.as_deref() {
        Some(fen) => Position::from_fen(fen)?,
        None => Position::startpos(),
    };

    let progress = if settings.display.show_board || settings.rounds <= 1 {
        None
    } else {
        Some(ProgressBar::new(settings.rounds as u64))
    };

    let mut summaries = Vec::with_capacity(settings.rounds as usize);
    for round in 1..=settings.rounds {
        if round > 1 {
            white.reset()?;
            black.reset()?;
        }
        let report = play_game(white, black, &start, &settings.display, cancel)?;
        let interrupted = report.outcome == Outcome::Interrupted;
        info!("round {round}/{}: {}", settings.rounds, report.outcome.message());
        summaries.push(summarize(round, settings.rounds, white, black, &report));
        if let Some(pb) = &progress {
            pb.inc(1);
        }
        if interrupted {
            break;
        }
    }
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    Ok(summaries)
}

fn summarize(
    round: u32,
    rounds_total: u32,
    white: &Seat,
    black: &Seat,
    report: &GameReport,
) -> GameSummary {
    let pos = &report.final_position;
    let white_pieces = pos.piece_count_of(Color::White) as u32;
    let black_pieces = pos.piece_count_of(Color::Black) as u32;
    GameSummary {
        round,
        rounds_total,
        depth: white.search_depth().or_else(|| black.search_depth()),
        white: white.name(),
        black: black.name(),
        outcome: report.outcome,
        message: report.outcome.message(),
        moves_played: report.moves_played,
        white_pieces,
        black_pieces,
        total_pieces: white_pieces + black_pieces,
    }
}
