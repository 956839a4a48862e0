//! Sliding puzzle session logic: tile slides, solve detection, and the
//! snapshot codec.

use rand::Rng;

use super::types::{is_adjacent, PuzzleGame, PuzzlePolicy};
use crate::session::ledger::{improve_min_u32, improve_min_u64};
use crate::session::snapshot::{self, SnapshotError, SnapshotMap};
use crate::session::timer::clamp_frame;
use crate::session::{
    Difficulty, GameKind, GameSession, LedgerEntry, Outcome, SessionEvent, SessionStatus,
};

impl GameSession for PuzzleGame {
    type Input = usize;

    const KIND: GameKind = GameKind::Puzzle;

    fn new_game<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        PuzzleGame::new(difficulty, rng)
    }

    fn status(&self) -> SessionStatus {
        self.status
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    fn start(&mut self) {
        if self.status != SessionStatus::NotStarted {
            return;
        }
        self.status = SessionStatus::Running;
    }

    fn pause(&mut self) {
        if self.status != SessionStatus::Running {
            return;
        }
        self.status = SessionStatus::Paused;
    }

    fn resume(&mut self) {
        if self.status != SessionStatus::Paused {
            return;
        }
        self.status = SessionStatus::Running;
    }

    /// Slide the tile at `index` into the blank. Only tiles 4-adjacent to
    /// the blank can move; the first accepted slide starts the clock.
    fn submit_input(&mut self, index: usize) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if matches!(self.status, SessionStatus::Paused | SessionStatus::Over) {
            return events;
        }
        if index >= self.tiles.len() || self.tiles[index] == 0 {
            return events;
        }
        let blank = self.blank_index();
        if !is_adjacent(index, blank, self.side) {
            return events;
        }

        self.start();

        self.tiles.swap(index, blank);
        self.moves += 1;

        if self.is_solved() {
            self.status = SessionStatus::Over;
            self.outcome = Some(Outcome::Won);
            events.push(SessionEvent::GameOver {
                outcome: Outcome::Won,
            });
        }

        events
    }

    /// Advance the display stopwatch.
    fn drive<R: Rng>(&mut self, dt_ms: u64, _rng: &mut R) -> Vec<SessionEvent> {
        if self.status == SessionStatus::Running {
            self.elapsed_ms += clamp_frame(dt_ms);
        }
        Vec::new()
    }

    fn snapshot(&self) -> SnapshotMap {
        let mut map = SnapshotMap::new();
        map.insert("difficulty".into(), self.difficulty.as_str().into());
        map.insert("moves".into(), self.moves.to_string());
        map.insert("elapsed_ms".into(), self.elapsed_ms.to_string());
        map.insert(
            "is_game_started".into(),
            self.status.is_game_started().to_string(),
        );
        map.insert("is_paused".into(), self.status.is_paused().to_string());
        map.insert(
            "tiles".into(),
            snapshot::encode_list(self.tiles.iter().copied()),
        );
        map
    }

    fn restore(map: &SnapshotMap) -> Result<Self, SnapshotError> {
        let raw_difficulty = snapshot::require(map, "difficulty")?;
        let difficulty = Difficulty::from_tag(raw_difficulty)
            .ok_or_else(|| SnapshotError::malformed("difficulty", raw_difficulty))?;
        let policy = PuzzlePolicy::for_difficulty(difficulty);

        let moves = snapshot::parse(map, "moves")?;
        let elapsed_ms = snapshot::parse(map, "elapsed_ms")?;
        let started: bool = snapshot::parse(map, "is_game_started")?;
        let paused: bool = snapshot::parse(map, "is_paused")?;

        let raw_tiles = snapshot::require(map, "tiles")?;
        let tiles: Vec<u8> = snapshot::decode_list("tiles", raw_tiles)?;
        let mut sorted = tiles.clone();
        sorted.sort_unstable();
        let n = policy.side as usize * policy.side as usize;
        if sorted != (0..n as u8).collect::<Vec<u8>>() {
            return Err(SnapshotError::malformed("tiles", raw_tiles));
        }

        let status = if !started {
            SessionStatus::NotStarted
        } else if paused {
            SessionStatus::Paused
        } else {
            SessionStatus::Running
        };

        Ok(Self {
            difficulty,
            status,
            outcome: None,
            side: policy.side,
            tiles,
            moves,
            elapsed_ms,
        })
    }

    /// Lower is better for both metrics, tracked independently.
    fn record_best(&self, entry: &mut LedgerEntry) -> bool {
        if self.outcome != Some(Outcome::Won) {
            return false;
        }
        let time_improved = improve_min_u64(&mut entry.best_time_ms, self.elapsed_ms);
        let moves_improved = improve_min_u32(&mut entry.best_moves, self.moves);
        time_improved | moves_improved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(17)
    }

    /// One slide away from solved: blank at 8, tile 8 at index 7... moving
    /// tile at index 7 right solves the board.
    fn nearly_solved() -> PuzzleGame {
        let mut game = PuzzleGame::new(Difficulty::Easy, &mut rng());
        game.tiles = vec![1, 2, 3, 4, 5, 6, 7, 0, 8];
        game
    }

    #[test]
    fn test_slide_adjacent_tile() {
        let mut game = nearly_solved();
        // Tile at index 4 (value 5) is adjacent to the blank at index 7.
        game.submit_input(4);
        assert_eq!(game.status, SessionStatus::Running);
        assert_eq!(game.tiles[7], 5);
        assert_eq!(game.tiles[4], 0);
        assert_eq!(game.moves, 1);
    }

    #[test]
    fn test_non_adjacent_slide_rejected() {
        let mut game = nearly_solved();
        game.submit_input(0);
        assert_eq!(game.status, SessionStatus::NotStarted);
        assert_eq!(game.moves, 0);
        assert_eq!(game.tiles[0], 1);
    }

    #[test]
    fn test_blank_itself_not_slidable() {
        let mut game = nearly_solved();
        game.submit_input(7);
        assert_eq!(game.moves, 0);
        assert_eq!(game.status, SessionStatus::NotStarted);
    }

    #[test]
    fn test_solving_ends_session() {
        let mut game = nearly_solved();
        let events = game.submit_input(8);

        assert!(game.is_solved());
        assert_eq!(game.status, SessionStatus::Over);
        assert_eq!(game.outcome, Some(Outcome::Won));
        assert_eq!(game.moves, 1);
        assert!(events.contains(&SessionEvent::GameOver {
            outcome: Outcome::Won
        }));
    }

    #[test]
    fn test_input_rejected_after_solve_and_while_paused() {
        let mut game = nearly_solved();
        game.submit_input(8);
        game.submit_input(5);
        assert_eq!(game.moves, 1);

        let mut game = nearly_solved();
        game.submit_input(4);
        game.pause();
        game.submit_input(4);
        assert_eq!(game.moves, 1);
    }

    #[test]
    fn test_stopwatch_only_runs_while_running() {
        let mut game = nearly_solved();
        game.drive(400, &mut rng());
        assert_eq!(game.elapsed_ms, 0);

        game.submit_input(4);
        game.drive(400, &mut rng());
        assert_eq!(game.elapsed_ms, 400);

        game.pause();
        game.drive(400, &mut rng());
        assert_eq!(game.elapsed_ms, 400);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut game = PuzzleGame::new(Difficulty::Medium, &mut rng());
        // Make a couple of legal moves.
        let blank = game.blank_index();
        let neighbor = super::super::types::neighbors(blank, game.side)[0];
        game.submit_input(neighbor);
        game.drive(1_200, &mut rng());

        let map = game.snapshot();
        let restored = PuzzleGame::restore(&map).expect("well-formed record");
        assert_eq!(restored.snapshot(), map);
        assert_eq!(restored.tiles, game.tiles);
        assert_eq!(restored.moves, game.moves);
        assert_eq!(restored.status, SessionStatus::Running);
    }

    #[test]
    fn test_restore_rejects_malformed_records() {
        let game = PuzzleGame::new(Difficulty::Easy, &mut rng());
        let good = game.snapshot();

        let mut map = good.clone();
        map.insert("tiles".into(), "1,2,3".into());
        assert!(PuzzleGame::restore(&map).is_err());

        let mut map = good.clone();
        map.insert("tiles".into(), "1,1,2,3,4,5,6,7,8".into());
        assert!(PuzzleGame::restore(&map).is_err());

        let mut map = good;
        map.remove("elapsed_ms");
        assert!(PuzzleGame::restore(&map).is_err());
    }

    #[test]
    fn test_record_best_only_on_win() {
        let game = nearly_solved();
        let mut entry = LedgerEntry::default();
        assert!(!game.record_best(&mut entry), "unfinished session records nothing");

        let mut game = nearly_solved();
        game.drive(1, &mut rng());
        game.submit_input(8);
        game.elapsed_ms = 30_000;
        let solved = game;
        let mut entry = LedgerEntry::default();
        assert!(solved.record_best(&mut entry));
        assert_eq!(entry.best_moves, Some(1));
        assert_eq!(entry.best_time_ms, Some(30_000));
    }
}
