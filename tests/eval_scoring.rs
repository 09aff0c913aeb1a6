use cozy_chess::Color;
use pretty_assertions::assert_eq;
use pitbot::board::Position;
use pitbot::eval::{material, material_and_position, mate_score, pst, Evaluator, Heuristic, MATE_SCORE};
use pitbot::tablebase::{TablebaseError, WdlProbe};
use std::sync::Arc;

struct FixedWdl(Option<i32>);

impl WdlProbe for FixedWdl {
    fn probe_wdl(&self, _fen: &str) -> Result<Option<i32>, TablebaseError> {
        Ok(self.0)
    }
}

#[test]
fn material_is_balanced_at_start() {
    let pos = Position::startpos();
    assert_eq!(material(pos.board(), Color::White), 0);
    assert_eq!(material(pos.board(), Color::Black), 0);
}

#[test]
fn material_counts_a_rook_advantage() {
    // White: Qd2 Rd1 Ke1, Black: Qd7 Ke8. White is a rook up.
    let pos = Position::from_fen("4k3/3q4/8/8/8/8/3Q4/3RK3 w - - 0 1").expect("valid fen");
    assert_eq!(material(pos.board(), Color::White), 500);
    assert_eq!(material(pos.board(), Color::Black), -500);
}

#[test]
fn swapping_all_piece_colors_negates_material() {
    // The rook-up position from above with every piece's color flipped.
    let pos = Position::from_fen("4k3/3q4/8/8/8/8/3Q4/3RK3 w - - 0 1").expect("valid fen");
    let swapped = Position::from_fen("4K3/3Q4/8/8/8/8/3q4/3rk3 w - - 0 1").expect("valid fen");
    assert_eq!(
        material(swapped.board(), Color::White),
        -material(pos.board(), Color::White)
    );
}

#[test]
fn piece_square_terms_are_mirrored_at_start() {
    let pos = Position::startpos();
    assert_eq!(pst::positional(pos.board()), 0);
    assert_eq!(material_and_position(pos.board(), Color::White), 0);
    assert_eq!(material_and_position(pos.board(), Color::Black), 0);
}

#[test]
fn pawn_push_to_the_center_gains_forty() {
    let pos = Position::startpos().apply_uci("e2e4").expect("legal");
    // e2 sits on -20 in the pawn table, e4 on +20.
    assert_eq!(pst::positional(pos.board()), 40);
    assert_eq!(material_and_position(pos.board(), Color::White), 40);
    assert_eq!(material_and_position(pos.board(), Color::Black), -40);
}

#[test]
fn mate_score_punishes_the_side_to_move() {
    let mate = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
        .expect("valid fen");
    assert_eq!(mate_score(&mate, Color::White), -MATE_SCORE);
    assert_eq!(mate_score(&mate, Color::Black), MATE_SCORE);
}

#[test]
fn naive_scoring_is_material_only_even_in_checkmate() {
    let mate = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
        .expect("valid fen");
    let mut eval = Evaluator::new(Heuristic::Naive);
    // No captures happened in the fool's mate, so material is level.
    assert_eq!(eval.score_position(&mate, Color::White), 0.0);
    assert_eq!(eval.score_position(&mate, Color::Black), 0.0);
}

#[test]
fn advanced_scoring_saturates_on_checkmate() {
    let mate = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
        .expect("valid fen");
    let mut eval = Evaluator::new(Heuristic::Advanced);
    assert_eq!(eval.score_position(&mate, Color::White), -MATE_SCORE);
    assert_eq!(eval.score_position(&mate, Color::Black), MATE_SCORE);
}

#[test]
fn advanced_scoring_calls_drawn_positions_zero() {
    let stale = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("valid fen");
    let mut eval = Evaluator::new(Heuristic::Advanced);
    assert_eq!(eval.score_position(&stale, Color::White), 0.0, "stalemate is dead level");

    // Bare kings read as a draw before the probe or material run, even
    // with a probe wired in that would say otherwise.
    let bare = Position::from_fen("k7/8/8/8/8/8/8/K7 w - - 0 1").expect("valid fen");
    let mut eval = Evaluator::new(Heuristic::Advanced).with_probe(Arc::new(FixedWdl(Some(-2))));
    assert_eq!(eval.score_position(&bare, Color::White), 0.0);
}

#[test]
fn improved_jitter_is_reproducible_by_seed() {
    let pos = Position::startpos();
    let mut a = Evaluator::new(Heuristic::Improved).with_seed(42);
    let mut b = Evaluator::new(Heuristic::Improved).with_seed(42);
    let sa = a.score_position(&pos, Color::White);
    let sb = b.score_position(&pos, Color::White);
    assert_eq!(sa, sb, "same seed should reproduce the jitter");
    assert!((0.0..1.0).contains(&sa), "level quiet position scores only jitter: {sa}");
}

#[test]
fn improved_swings_nine_hundred_on_a_check() {
    // After 1.e4 d5 2.Bb5+ black is in check with full material on the board.
    let pos = Position::from_fen("rnbqkbnr/ppp1pppp/8/1B1p4/4P3/8/PPPP1PPP/RNBQK1NR b KQkq - 1 2")
        .expect("valid fen");
    assert!(pos.in_check(), "black should be in check from Bb5");

    let mut eval = Evaluator::new(Heuristic::Improved).with_seed(7);
    let s = eval.score_position(&pos, Color::Black);
    assert!((-900.0..-899.0).contains(&s), "checked side pays 900 plus jitter, got {s}");

    let mut eval = Evaluator::new(Heuristic::Improved).with_seed(7);
    let s = eval.score_position(&pos, Color::White);
    assert!((900.0..901.0).contains(&s), "checking side earns 900 plus jitter, got {s}");
}

#[test]
fn improved_move_scoring_prefers_the_capture() {
    let pos = Position::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2")
        .expect("valid fen");
    let take = pos.find_uci("e4d5").expect("pawn capture");
    let quiet = pos.find_uci("g1f3").expect("knight development");

    let mut eval = Evaluator::new(Heuristic::Improved).with_seed(9);
    let take_score = eval.score_move(&pos, take, Color::White);
    let quiet_score = eval.score_move(&pos, quiet, Color::White);
    // Capture bonus 50 plus the won pawn's 100, against bare jitter.
    assert!((150.0..151.0).contains(&take_score), "capture score out of range: {take_score}");
    assert!((0.0..1.0).contains(&quiet_score), "quiet score out of range: {quiet_score}");
    assert!(take_score > quiet_score);
}
