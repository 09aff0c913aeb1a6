use cozy_chess::Color;

use crate::board::Position;
use crate::eval::{Evaluator, Score, DRAW_SCORE, MATE_SCORE};
use crate::search::{
    rank_descending, terminal_score, ScoredMove, SearchResult, WINDOW_MAX, WINDOW_MIN,
};

/// Alpha-beta variant of the fixed-depth search. Same value function as the
/// plain minimax searcher; the window only cuts subtrees that cannot change
/// a node's value.
pub struct AlphaBetaSearcher {
    eval: Evaluator,
    max_depth: u32,
    nodes: u64,
}

impl AlphaBetaSearcher {
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

    /// Score every root move. Each candidate gets a fresh full window, so
    /// every root score is exact rather than a bound and the ranking matches
    /// the exhaustive search move for move.
    pub fn rank_root(&mut self, pos: &Position) -> Vec<ScoredMove> {
        self.nodes = 0;
        let perspective = pos.side_to_move();
        let mut scored = Vec::new();
        for mv in pos.legal_moves() {
            let child = pos.apply(mv);
            let score = self.decide(&child, false, self.max_depth, WINDOW_MIN, WINDOW_MAX, perspective);
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

    fn decide(
        &mut self,
        pos: &Position,
        maximizing: bool,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        perspective: Color,
    ) -> Score {
        self.nodes += 1;
        if depth == 0 {
            return self.eval.score_position(pos, perspective);
        }
        let moves = pos.legal_moves();
        if moves.is_empty() {
            return terminal_score(pos, perspective);
        }
        if maximizing {
            let mut best = -MATE_SCORE;
            for mv in moves {
                let child = pos.apply(mv);
                best = best.max(self.decide(&child, false, depth - 1, alpha, beta, perspective));
                if best >= beta {
                    return best;
                }
                alpha = alpha.max(best);
            }
            best
        } else {
            let mut best = MATE_SCORE;
            for mv in moves {
                let child = pos.apply(mv);
                best = best.min(self.decide(&child, true, depth - 1, alpha, beta, perspective));
                if best <= alpha {
                    return best;
                }
                beta = beta.min(best);
            }
            best
        }
    }
}
