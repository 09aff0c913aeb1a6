use cozy_chess::Color;

use crate::board::Position;
use crate::eval::{Evaluator, Score, DRAW_SCORE, MATE_SCORE};
use crate::search::{rank_descending, terminal_score, ScoredMove, SearchResult};

/// Plain fixed-depth minimax with explicit max/min levels. Exhaustive by
/// construction; the pruning variant must reproduce its root scores exactly.
pub struct MinimaxSearcher {
    eval: Evaluator,
    max_depth: u32,
    nodes: u64,
}

impl MinimaxSearcher {
    pub fn new(eval: Evaluator, max_depth: u32) -> Self {
        Self { eval, max_depth, nodes: 0 }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn eval_mut(&mut self) -> &mut Evaluator {
        &mut self.eval
    }

    /// Nodes visited by the most recent root search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Score every root move. Each candidate child is searched as a
    /// minimizing node at full remaining depth, from the mover's own
    /// perspective.
    pub fn rank_root(&mut self, pos: &Position) -> Vec<ScoredMove> {
        self.nodes = 0;
        let perspective = pos.side_to_move();
        let mut scored = Vec::new();
        for mv in pos.legal_moves() {
            let child = pos.apply(mv);
            let score = self.decide(&child, false, self.max_depth, perspective);
            scored.push(ScoredMove { mv, score });
        }
        rank_descending(&mut scored);
        scored
    }

    pub fn search(&mut self, pos: &Position) -> SearchResult {
        let ranked = self.rank_root(pos);
        let best = ranked.first();
        SearchResult {
            bestmove: best.map(|sm| pos.uci(sm.mv)),
            score: best.map_or(DRAW_SCORE, |sm| sm.score),
            nodes: self.nodes,
        }
    }

    fn decide(&mut self, pos: &Position, maximizing: bool, depth: u32, perspective: Color) -> Score {
        self.nodes += 1;
        if depth == 0 {
            return self.eval.score_position(pos, perspective);
        }
        let moves = pos.legal_moves();
        if moves.is_empty() {
            return terminal_score(pos, perspective);
        }
        let mut best = if maximizing { -MATE_SCORE } else { MATE_SCORE };
        for mv in moves {
            let child = pos.apply(mv);
            let result = self.decide(&child, !maximizing, depth - 1, perspective);
            best = if maximizing { best.max(result) } else { best.min(result) };
        }
        best
    }
}
