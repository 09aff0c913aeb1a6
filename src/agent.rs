use std::sync::Arc;

use cozy_chess::Move;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::Position;
use crate::eval::{Evaluator, Heuristic};
use crate::search::{rank_descending, AlphaBetaSearcher, MinimaxSearcher, ScoredMove};
use crate::tablebase::WdlProbe;

/// Which searcher a search-backed agent runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchKind {
    Minimax,
    AlphaBeta,
}

enum Policy {
    Random { rng: SmallRng },
    CaptureRandom { rng: SmallRng },
    Greedy { eval: Evaluator },
    Minimax(MinimaxSearcher),
    AlphaBeta(AlphaBetaSearcher),
}

/// A seated player: a move-selection policy plus its display name.
pub struct Agent {
    name: String,
    policy: Policy,
}

impl Agent {
    /// Uniform choice over all legal moves.
    pub fn random() -> Self {
        Self {
            name: "random_agent".to_string(),
            policy: Policy::Random { rng: SmallRng::from_entropy() },
        }
    }

    /// Uniform choice over captures when any exist, else over all legal
    /// moves.
    pub fn capture_random() -> Self {
        Self {
            name: "improved_random_agent".to_string(),
            policy: Policy::CaptureRandom { rng: SmallRng::from_entropy() },
        }
    }

    /// One-ply greedy move choice under the given heuristic.
    pub fn greedy(heuristic: Heuristic) -> Self {
        Self {
            name: format!("{}_agent", heuristic.label()),
            policy: Policy::Greedy { eval: Evaluator::new(heuristic) },
        }
    }

    /// Search-backed agent at a fixed depth. Depth 0 degenerates to scoring
    /// each root child directly, one ply deep.
    pub fn searching(heuristic: Heuristic, kind: SearchKind, depth: u32) -> Self {
        let eval = Evaluator::new(heuristic);
        let (name, policy) = match kind {
            SearchKind::Minimax => (
                format!("{}_minimax_agent", heuristic.label()),
                Policy::Minimax(MinimaxSearcher::new(eval, depth)),
            ),
            SearchKind::AlphaBeta => (
                format!("{}_alpha-beta_minimax_agent", heuristic.label()),
                Policy::AlphaBeta(AlphaBetaSearcher::new(eval, depth)),
            ),
        };
        Self { name, policy }
    }

    /// Reseed every random component for deterministic replay.
    pub fn with_seed(mut self, seed: u64) -> Self {
        match &mut self.policy {
            Policy::Random { rng } | Policy::CaptureRandom { rng } => {
                *rng = SmallRng::seed_from_u64(seed);
            }
            Policy::Greedy { eval } => eval.reseed(seed),
            Policy::Minimax(searcher) => searcher.eval_mut().reseed(seed),
            Policy::AlphaBeta(searcher) => searcher.eval_mut().reseed(seed),
        }
        self
    }

    /// Install a tablebase probe on the evaluator, if the policy has one.
    pub fn with_probe(mut self, probe: Arc<dyn WdlProbe>) -> Self {
        match &mut self.policy {
            Policy::Random { .. } | Policy::CaptureRandom { .. } => {}
            Policy::Greedy { eval } => eval.set_probe(probe),
            Policy::Minimax(searcher) => searcher.eval_mut().set_probe(probe),
            Policy::AlphaBeta(searcher) => searcher.eval_mut().set_probe(probe),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Search depth for search-backed agents.
    pub fn search_depth(&self) -> Option<u32> {
        match &self.policy {
            Policy::Minimax(searcher) => Some(searcher.max_depth()),
            Policy::AlphaBeta(searcher) => Some(searcher.max_depth()),
            _ => None,
        }
    }

    /// Pick a move in `pos`, returned as a UCI string, or `None` when the
    /// position has no legal moves.
    pub fn choose_move(&mut self, pos: &Position) -> Option<String> {
        let chosen = match &mut self.policy {
            Policy::Random { rng } => pick_uniform(&pos.legal_moves(), rng),
            Policy::CaptureRandom { rng } => {
                let moves = pos.legal_moves();
                let captures: Vec<Move> =
                    moves.iter().copied().filter(|&m| pos.is_capture(m)).collect();
                if captures.is_empty() {
                    pick_uniform(&moves, rng)
                } else {
                    pick_uniform(&captures, rng)
                }
            }
            Policy::Greedy { eval } => {
                let perspective = pos.side_to_move();
                let mut scored: Vec<ScoredMove> = pos
                    .legal_moves()
                    .into_iter()
                    .map(|mv| ScoredMove { mv, score: eval.score_move(pos, mv, perspective) })
                    .collect();
                rank_descending(&mut scored);
                scored.first().map(|sm| sm.mv)
            }
            Policy::Minimax(searcher) => return searcher.search(pos).bestmove,
            Policy::AlphaBeta(searcher) => return searcher.search(pos).bestmove,
        };
        chosen.map(|mv| pos.uci(mv))
    }
}

fn pick_uniform(moves: &[Move], rng: &mut SmallRng) -> Option<Move> {
    if moves.is_empty() {
        None
    } else {
        Some(moves[rng.gen_range(0..moves.len())])
    }
}
