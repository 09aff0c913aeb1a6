use pitbot::board::Position;
use pitbot::eval::{Evaluator, Heuristic, MATE_SCORE};
use pitbot::search::{AlphaBetaSearcher, MinimaxSearcher};

/// Scholar's mate one move out: Qf3xf7 is the only mate on the board.
const MATE_IN_ONE: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

/// After 1.f3 e5, 2.g4 walks into Qh4 mate.
const MATE_TRAP: &str = "rnbqkbnr/pppp1ppp/8/4p3/8/5P2/PPPPP1PP/RNBQKBNR w KQkq e6 0 2";

fn agree(fen: &str, heuristic: Heuristic, depth: u32) {
    let pos = Position::from_fen(fen).expect("valid fen");
    let mut mm = MinimaxSearcher::new(Evaluator::new(heuristic), depth);
    let mut ab = AlphaBetaSearcher::new(Evaluator::new(heuristic), depth);
    let m = mm.search(&pos);
    let a = ab.search(&pos);
    assert_eq!(m.bestmove, a.bestmove, "choice diverged on {fen} at depth {depth}");
    assert_eq!(m.score, a.score, "score diverged on {fen} at depth {depth}");
    assert!(
        a.nodes <= m.nodes,
        "pruning can only shrink the tree on {fen}: {} > {}",
        a.nodes,
        m.nodes
    );
}

#[test]
fn minimax_finds_mate_in_one() {
    let pos = Position::from_fen(MATE_IN_ONE).expect("valid fen");
    for depth in [1, 2] {
        let mut searcher = MinimaxSearcher::new(Evaluator::new(Heuristic::Naive), depth);
        let res = searcher.search(&pos);
        assert_eq!(res.bestmove.as_deref(), Some("f3f7"), "depth {depth}");
        assert_eq!(res.score, MATE_SCORE, "depth {depth}");
    }
}

#[test]
fn alphabeta_finds_mate_in_one() {
    let pos = Position::from_fen(MATE_IN_ONE).expect("valid fen");
    for depth in [1, 2] {
        let mut searcher = AlphaBetaSearcher::new(Evaluator::new(Heuristic::Advanced), depth);
        let res = searcher.search(&pos);
        assert_eq!(res.bestmove.as_deref(), Some("f3f7"), "depth {depth}");
        assert_eq!(res.score, MATE_SCORE, "depth {depth}");
    }
}

#[test]
fn search_avoids_the_losing_reply() {
    let pos = Position::from_fen(MATE_TRAP).expect("valid fen");
    // Depth 1 needs the evaluator to spot the mate at the leaf; depth 2
    // reaches the mated node inside the tree, so bare material suffices.
    for (heuristic, depth) in [(Heuristic::Advanced, 1), (Heuristic::Naive, 2)] {
        let mut mm = MinimaxSearcher::new(Evaluator::new(heuristic), depth);
        let res = mm.search(&pos);
        assert_ne!(res.bestmove.as_deref(), Some("g2g4"), "depth {depth} walked into mate");
        assert!(res.score > -MATE_SCORE, "depth {depth} score {}", res.score);

        let mut ab = AlphaBetaSearcher::new(Evaluator::new(heuristic), depth);
        let res = ab.search(&pos);
        assert_ne!(res.bestmove.as_deref(), Some("g2g4"), "depth {depth} walked into mate");
    }
}

#[test]
fn alphabeta_matches_minimax_choice_and_score() {
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
        MATE_IN_ONE,
        MATE_TRAP,
        "k7/8/8/8/8/8/1R6/K7 w - - 0 1",
    ];
    for fen in fens {
        for heuristic in [Heuristic::Naive, Heuristic::Advanced] {
            agree(fen, heuristic, 1);
            agree(fen, heuristic, 2);
        }
    }
}

#[test]
fn alphabeta_matches_minimax_deeper_in_the_endgame() {
    agree("k7/8/8/8/8/8/1R6/K7 w - - 0 1", Heuristic::Advanced, 3);
    agree("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", Heuristic::Naive, 3);
}

#[test]
fn alphabeta_actually_prunes() {
    // Constant material everywhere makes the first cutoff immediate.
    let pos = Position::from_fen("k7/8/8/8/8/8/1R6/K7 w - - 0 1").expect("valid fen");
    let mut mm = MinimaxSearcher::new(Evaluator::new(Heuristic::Naive), 2);
    let mut ab = AlphaBetaSearcher::new(Evaluator::new(Heuristic::Naive), 2);
    let m = mm.search(&pos);
    let a = ab.search(&pos);
    assert_eq!(m.bestmove, a.bestmove);
    assert!(
        a.nodes < m.nodes,
        "expected cutoffs at depth 2: alphabeta {} vs minimax {}",
        a.nodes,
        m.nodes
    );
}

#[test]
fn search_reports_no_move_in_terminal_positions() {
    let mate = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
        .expect("valid fen");
    let mut searcher = AlphaBetaSearcher::new(Evaluator::new(Heuristic::Advanced), 2);
    let res = searcher.search(&mate);
    assert_eq!(res.bestmove, None, "checkmated side has nothing to play");
    assert_eq!(res.score, 0.0, "empty root falls back to the draw score");
}
