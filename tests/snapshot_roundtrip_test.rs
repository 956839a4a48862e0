//! Integration test: snapshot codec round trips
//!
//! Every engine must rebuild its exact pre-save state from a flat record,
//! and malformed records must read as "no saved game" at the controller.

use chorequest::session::snapshot;
use chorequest::{
    BreakoutGame, BreakoutInput, Difficulty, Direction, GameSession, MemoryGame, PuzzleGame,
    QuizGame, SessionStatus, SnakeGame,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(99)
}

/// snapshot(restore(snapshot(s))) == snapshot(s), through the blob form the
/// store actually carries.
fn assert_blob_round_trip<G: GameSession>(game: &G) {
    let map = game.snapshot();
    let blob = snapshot::to_blob(&map);
    let recovered = snapshot::from_blob(&blob).expect("blob parses");
    let restored = G::restore(&recovered).expect("record restores");
    assert_eq!(restored.snapshot(), map);
}

// =============================================================================
// Round Trips Per Engine and Phase
// =============================================================================

#[test]
fn test_snake_round_trips_in_every_nonterminal_phase() {
    let mut game = SnakeGame::new(Difficulty::Hard, &mut rng());
    assert_blob_round_trip(&game); // NotStarted

    game.submit_input(Direction::Down);
    game.drive(120, &mut rng());
    assert_blob_round_trip(&game); // Running

    game.pause();
    assert_blob_round_trip(&game); // Paused
}

#[test]
fn test_breakout_round_trips_in_every_nonterminal_phase() {
    let mut game = BreakoutGame::new(Difficulty::Easy, &mut rng());
    game.submit_input(BreakoutInput::MovePaddle(12.5));
    assert_blob_round_trip(&game);

    game.submit_input(BreakoutInput::Launch);
    game.drive(160, &mut rng());
    assert_blob_round_trip(&game);

    game.pause();
    assert_blob_round_trip(&game);
}

#[test]
fn test_memory_round_trips_in_every_nonterminal_phase() {
    let mut game = MemoryGame::new(Difficulty::Medium, &mut rng());
    assert_blob_round_trip(&game);

    game.submit_input(3);
    game.drive(700, &mut rng());
    assert_blob_round_trip(&game);

    game.pause();
    assert_blob_round_trip(&game);
}

#[test]
fn test_puzzle_and_quiz_round_trip() {
    let mut puzzle = PuzzleGame::new(Difficulty::Hard, &mut rng());
    let blank = puzzle.blank_index();
    let side = puzzle.side;
    let neighbor = chorequest::games::puzzle::types::neighbors(blank, side)[0];
    puzzle.submit_input(neighbor);
    puzzle.drive(450, &mut rng());
    assert_blob_round_trip(&puzzle);

    let mut quiz = QuizGame::new(Difficulty::Hard, &mut rng());
    quiz.submit_input(1);
    quiz.drive(450, &mut rng());
    assert_blob_round_trip(&quiz);
}

// =============================================================================
// Restore Rebuilds Live State
// =============================================================================

#[test]
fn test_restore_rearms_running_snake() {
    let mut game = SnakeGame::new(Difficulty::Medium, &mut rng());
    game.submit_input(Direction::Right);
    game.drive(180, &mut rng());

    let restored = SnakeGame::restore(&game.snapshot()).expect("record restores");
    assert_eq!(restored.status, SessionStatus::Running);
    assert!(restored.timer.is_some(), "running record re-arms the timer");

    // The restored session keeps simulating from exactly where it stopped.
    let mut restored = restored;
    let head = restored.body[0];
    restored.drive(180, &mut rng());
    assert_eq!(restored.body[0].x, head.x + 1);
}

#[test]
fn test_restore_paused_breakout_stays_paused() {
    let mut game = BreakoutGame::new(Difficulty::Medium, &mut rng());
    game.submit_input(BreakoutInput::Launch);
    game.drive(160, &mut rng());
    game.pause();

    let restored = BreakoutGame::restore(&game.snapshot()).expect("record restores");
    assert_eq!(restored.status, SessionStatus::Paused);
    assert!(restored.timer.is_none());
}

#[test]
fn test_restore_not_started_quiz() {
    let game = QuizGame::new(Difficulty::Easy, &mut rng());
    let restored = QuizGame::restore(&game.snapshot()).expect("record restores");
    assert_eq!(restored.status, SessionStatus::NotStarted);
    assert_eq!(restored.order, game.order);
}

// =============================================================================
// Malformed Records
// =============================================================================

#[test]
fn test_malformed_blobs_never_restore() {
    for blob in ["", "garbage", "[]", "{\"difficulty\":5}"] {
        let parsed = snapshot::from_blob(blob);
        let restorable = parsed
            .as_ref()
            .map(|map| SnakeGame::restore(map).is_ok())
            .unwrap_or(false);
        assert!(!restorable, "blob {:?} must not restore", blob);
    }
}

#[test]
fn test_truncated_record_rejected_per_engine() {
    let mut snake = SnakeGame::new(Difficulty::Easy, &mut rng());
    snake.submit_input(Direction::Up);
    let mut map = snake.snapshot();
    map.remove("heading");
    assert!(SnakeGame::restore(&map).is_err());

    let breakout = BreakoutGame::new(Difficulty::Easy, &mut rng());
    let mut map = breakout.snapshot();
    map.remove("bricks");
    assert!(BreakoutGame::restore(&map).is_err());

    let memory = MemoryGame::new(Difficulty::Easy, &mut rng());
    let mut map = memory.snapshot();
    map.remove("symbols");
    assert!(MemoryGame::restore(&map).is_err());

    let puzzle = PuzzleGame::new(Difficulty::Easy, &mut rng());
    let mut map = puzzle.snapshot();
    map.remove("tiles");
    assert!(PuzzleGame::restore(&map).is_err());

    let quiz = QuizGame::new(Difficulty::Easy, &mut rng());
    let mut map = quiz.snapshot();
    map.remove("order");
    assert!(QuizGame::restore(&map).is_err());
}

#[test]
fn test_cross_game_records_do_not_restore() {
    // A snake record is not a breakout record; strict decoding keeps game
    // blobs from bleeding into each other.
    let mut snake = SnakeGame::new(Difficulty::Easy, &mut rng());
    snake.submit_input(Direction::Up);
    assert!(BreakoutGame::restore(&snake.snapshot()).is_err());
    assert!(MemoryGame::restore(&snake.snapshot()).is_err());
}
