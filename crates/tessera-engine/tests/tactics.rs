//! End-to-end search tests on tactical positions.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tessera_engine::{CHECKMATE, Game, SearchControl, Searcher, move_to_uci};

/// Search a FEN to a fixed depth and return (best move, score).
fn search(fen: &str, depth: i32) -> (String, i32) {
    let game = Game::from_fen(fen).expect("test FEN must parse");
    let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
    let result = Searcher::new().search(&game, &[], depth, &control, |_| {});
    let best = result.best_move.expect("position has legal moves");
    (move_to_uci(&best), result.score)
}

#[test]
fn rook_mate_in_one() {
    let (best, score) = search("4k3/8/4K3/8/8/8/8/7R w - - 0 1", 2);
    assert_eq!(best, "h1h8");
    assert_eq!(score, CHECKMATE - 1);
}

#[test]
fn scholars_mate() {
    let (best, score) = search(
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        2,
    );
    assert_eq!(best, "h5f7");
    assert!(score > CHECKMATE - 1000);
}

#[test]
fn promotes_the_passed_pawn() {
    let (best, score) = search("7k/4P3/8/8/8/8/8/4K3 w - - 0 1", 4);
    assert_eq!(best, "e7e8q");
    assert!(score > 800, "a new queen should dominate the score, got {score}");
}

#[test]
fn grabs_the_hanging_queen() {
    // The pawn capture removes Black's whole advantage and leaves
    // White up a passed pawn.
    let (best, score) = search("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1", 3);
    assert_eq!(best, "e4d5");
    assert!(score > 0, "got {score}");
}

#[test]
fn scandinavian_center_pawn() {
    let (best, score) = search(
        "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
        4,
    );
    assert!(
        best == "e4d5" || score >= 80,
        "expected the d5 capture or a clearly better line, got {best} ({score})"
    );
}

#[test]
fn dead_draw_scores_zero() {
    let (_, score) = search("8/8/4k3/8/8/4K3/8/8 w - - 0 1", 4);
    assert_eq!(score, 0);
}

#[test]
fn saves_the_attacked_queen() {
    // The rook on e5 attacks the queen down the open file; capturing
    // it solves the problem at a profit.
    let (best, score) = search("4k3/8/8/4r3/8/8/4Q3/3K4 w - - 0 1", 3);
    assert_eq!(best, "e2e5");
    assert!(score > 400, "got {score}");
}

#[test]
fn stop_is_honored_promptly() {
    let game = Game::starting_position();
    let stopped = Arc::new(AtomicBool::new(false));
    let control = SearchControl::new_timed(Arc::clone(&stopped), Duration::from_millis(10_000));

    let stop = Arc::clone(&stopped);
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        stop.store(true, Ordering::Release);
    });

    let start = Instant::now();
    let result = Searcher::new().search(&game, &[], 120, &control, |_| {});
    let elapsed = start.elapsed();
    stopper.join().expect("stopper thread");

    assert!(
        elapsed < Duration::from_millis(300),
        "bestmove must follow a stop promptly, took {elapsed:?}"
    );
    assert!(result.best_move.is_some());
}

#[test]
fn movetime_budget_is_respected() {
    let game = Game::starting_position();
    let control = SearchControl::new_timed(
        Arc::new(AtomicBool::new(false)),
        Duration::from_millis(100),
    );
    let start = Instant::now();
    let result = Searcher::new().search(&game, &[], 120, &control, |_| {});
    assert!(
        start.elapsed() < Duration::from_millis(1000),
        "deadline overshot by far"
    );
    assert!(result.best_move.is_some());
    assert!(result.depth >= 1, "100ms buys at least one shallow depth");
}
