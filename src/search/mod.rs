pub mod alphabeta;
pub mod minimax;

pub use alphabeta::AlphaBetaSearcher;
pub use minimax::MinimaxSearcher;

use cozy_chess::{Color, Move};

use crate::board::Position;
use crate::eval::{mate_score, Score, DRAW_SCORE};

/// Pruning window bounds, strictly wider than any reachable score.
pub const WINDOW_MIN: Score = -10_000.0;
pub const WINDOW_MAX: Score = 10_000.0;

/// A root candidate paired with the score its subtree searched to.
#[derive(Debug, Clone, Copy)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: Score,
}

/// Outcome of a root search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub bestmove: Option<String>,
    pub score: Score,
    pub nodes: u64,
}

/// Highest score first. The sort is stable, so ties keep the generator's
/// move order and the first maximal candidate wins.
pub fn rank_descending(scored: &mut [ScoredMove]) {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Score for a node with no legal moves: mate against the side to move, or a
/// dead draw.
pub(crate) fn terminal_score(pos: &Position, perspective: Color) -> Score {
    if pos.in_check() {
        mate_score(pos, perspective)
    } else {
        DRAW_SCORE
    }
}
