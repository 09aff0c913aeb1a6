pub mod pst;

use std::str::FromStr;
use std::sync::Arc;

use cozy_chess::{Board, Color, Move, Piece};
use log::warn;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::Position;
use crate::tablebase::{WdlProbe, PROBE_PIECE_LIMIT};

/// Scores are real-valued so the randomized tie-break jitter can split
/// positions of equal material.
pub type Score = f64;

/// Saturation score for a delivered or suffered checkmate.
pub const MATE_SCORE: Score = 9999.0;
pub const DRAW_SCORE: Score = 0.0;

pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;

fn count_piece(board: &Board, color: Color, piece: Piece) -> i32 {
    let bb = board.colors(color) & board.pieces(piece);
    bb.into_iter().count() as i32
}

/// Weighted material from `perspective`. Kings carry no weight.
pub fn material(board: &Board, perspective: Color) -> i32 {
    let us = perspective;
    let them = !perspective;
    (count_piece(board, us, Piece::Pawn) - count_piece(board, them, Piece::Pawn)) * PAWN_VALUE
        + (count_piece(board, us, Piece::Knight) - count_piece(board, them, Piece::Knight)) * KNIGHT_VALUE
        + (count_piece(board, us, Piece::Bishop) - count_piece(board, them, Piece::Bishop)) * BISHOP_VALUE
        + (count_piece(board, us, Piece::Rook) - count_piece(board, them, Piece::Rook)) * ROOK_VALUE
        + (count_piece(board, us, Piece::Queen) - count_piece(board, them, Piece::Queen)) * QUEEN_VALUE
}

/// Material plus piece-square terms from `perspective`.
pub fn material_and_position(board: &Board, perspective: Color) -> i32 {
    let white_view = material(board, Color::White) + pst::positional(board);
    if perspective == Color::White {
        white_view
    } else {
        -white_view
    }
}

/// Mate score relative to `perspective`; the side to move in a checkmate
/// position is the loser.
pub fn mate_score(pos: &Position, perspective: Color) -> Score {
    if pos.side_to_move() == perspective {
        -MATE_SCORE
    } else {
        MATE_SCORE
    }
}

/// The three static evaluation flavors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heuristic {
    /// Weighted material only. No terminal handling, no probing.
    Naive,
    /// Material with a random tie-break jitter, check bonuses, and the
    /// endgame probe.
    Improved,
    /// Material plus piece-square tables, draw detection, and the endgame
    /// probe.
    Advanced,
}

impl Heuristic {
    pub fn label(self) -> &'static str {
        match self {
            Heuristic::Naive => "naive",
            Heuristic::Improved => "improved",
            Heuristic::Advanced => "advanced",
        }
    }
}

impl FromStr for Heuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naive" => Ok(Heuristic::Naive),
            "improved" => Ok(Heuristic::Improved),
            "advanced" => Ok(Heuristic::Advanced),
            other => Err(format!("unknown heuristic {other:?} (expected naive|improved|advanced)")),
        }
    }
}

/// A configured evaluator. The probe and the jitter source are injectable so
/// games can run offline and replay deterministically.
#[derive(Clone)]
pub struct Evaluator {
    heuristic: Heuristic,
    tablebase: Option<Arc<dyn WdlProbe>>,
    rng: SmallRng,
}

impl Evaluator {
    pub fn new(heuristic: Heuristic) -> Self {
        Self {
            heuristic,
            tablebase: None,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub fn set_probe(&mut self, probe: Arc<dyn WdlProbe>) {
        self.tablebase = Some(probe);
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn WdlProbe>) -> Self {
        self.set_probe(probe);
        self
    }

    /// Absolute score of `pos` from `perspective`; used at search leaves.
    pub fn score_position(&mut self, pos: &Position, perspective: Color) -> Score {
        match self.heuristic {
            Heuristic::Naive => material(pos.board(), perspective) as Score,
            Heuristic::Improved => self.improved_position(pos, perspective),
            Heuristic::Advanced => self.advanced_position(pos, perspective),
        }
    }

    /// Score of playing `mv` in `pos` from `perspective`; used by the
    /// one-ply greedy policy. The improved flavor folds in move context
    /// (capture bonus) that plain position scoring cannot see.
    pub fn score_move(&mut self, pos: &Position, mv: Move, perspective: Color) -> Score {
        match self.heuristic {
            Heuristic::Naive => material(pos.apply(mv).board(), perspective) as Score,
            Heuristic::Improved => self.improved_move(pos, mv, perspective),
            Heuristic::Advanced => self.advanced_position(&pos.apply(mv), perspective),
        }
    }

    fn improved_position(&mut self, pos: &Position, perspective: Color) -> Score {
        if pos.is_checkmate() {
            return mate_score(pos, perspective);
        }
        if pos.piece_count() <= PROBE_PIECE_LIMIT {
            return self.probe_score(pos);
        }
        let mut score = self.rng.gen::<f64>();
        score += material(pos.board(), perspective) as Score;
        if pos.in_check() {
            score += if pos.side_to_move() == perspective { -900.0 } else { 900.0 };
        }
        score
    }

    fn improved_move(&mut self, pos: &Position, mv: Move, perspective: Color) -> Score {
        let mut bonus = self.rng.gen::<f64>();
        if pos.is_capture(mv) {
            bonus += 50.0;
        }
        let after = pos.apply(mv);
        if after.is_checkmate() {
            return MATE_SCORE;
        }
        if after.piece_count() <= PROBE_PIECE_LIMIT {
            return self.probe_score(&after);
        }
        let mut score = bonus + material(after.board(), perspective) as Score;
        if after.in_check() {
            score += 900.0;
        }
        score
    }

    fn advanced_position(&mut self, pos: &Position, perspective: Color) -> Score {
        if pos.is_checkmate() {
            return mate_score(pos, perspective);
        }
        if pos.is_stalemate() || pos.is_insufficient_material() {
            return DRAW_SCORE;
        }
        if pos.piece_count() <= PROBE_PIECE_LIMIT {
            return self.probe_score(pos);
        }
        material_and_position(pos.board(), perspective) as Score
    }

    /// Map a WDL probe to a score. A losing side to move favors the agent
    /// whose move produced this position.
    fn probe_score(&self, pos: &Position) -> Score {
        let wdl = match self.tablebase.as_deref() {
            Some(probe) => match probe.probe_wdl(&pos.fen()) {
                Ok(wdl) => wdl,
                Err(err) => {
                    warn!("tablebase probe failed: {err}; scoring position as unknown");
                    None
                }
            },
            None => None,
        };
        match wdl {
            Some(wdl) if wdl < 0 => 50.0,
            Some(_) => -50.0,
            None => 0.0,
        }
    }
}
