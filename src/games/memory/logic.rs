//! Memory session logic: flip handling, pair evaluation, the delayed
//! flip-back, and the snapshot codec.

use rand::Rng;

use super::types::{Card, FlipBack, MemoryGame, MemoryPolicy, FLIP_BACK_DELAY_MS};
use crate::session::ledger::{improve_min_u32, improve_min_u64};
use crate::session::snapshot::{self, SnapshotError, SnapshotMap};
use crate::session::timer::clamp_frame;
use crate::session::{
    Difficulty, GameKind, GameSession, LedgerEntry, Outcome, SessionEvent, SessionStatus,
};

impl GameSession for MemoryGame {
    type Input = usize;

    const KIND: GameKind = GameKind::Memory;

    fn new_game<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        MemoryGame::new(difficulty, rng)
    }

    /// The generation counter survives the reset so a flip-back scheduled
    /// against the previous deck can never touch the new one.
    fn reset<R: Rng>(&mut self, difficulty: Difficulty, rng: &mut R) {
        let generation = self.generation.wrapping_add(1);
        *self = Self::new_game(difficulty, rng);
        self.generation = generation;
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

    /// Event-driven: starting is just the status flip. The stopwatch runs
    /// from the first qualifying input because that input lands here first.
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

    /// Flip the card at `index`. Rejected while two cards are face-up — the
    /// flip-back delay window included, which is exactly what makes the
    /// delay window input-proof.
    fn submit_input(&mut self, index: usize) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if matches!(self.status, SessionStatus::Paused | SessionStatus::Over) {
            return events;
        }
        if index >= self.cards.len() || self.face_up.len() >= 2 {
            return events;
        }
        let card = self.cards[index];
        if card.is_matched || card.is_flipped {
            return events;
        }

        // A valid first flip is the qualifying input that starts the clock.
        self.start();

        self.cards[index].is_flipped = true;
        self.face_up.push(index);

        if self.face_up.len() < 2 {
            return events;
        }

        // Second card of the pair: evaluate.
        let (first, second) = (self.face_up[0], self.face_up[1]);
        self.moves += 1;

        if self.cards[first].symbol_id == self.cards[second].symbol_id {
            self.cards[first].is_matched = true;
            self.cards[second].is_matched = true;
            self.face_up.clear();
            events.push(SessionEvent::MatchFound {
                symbol_id: self.cards[first].symbol_id,
            });

            if self.cards.iter().all(|c| c.is_matched) {
                self.status = SessionStatus::Over;
                self.outcome = Some(Outcome::Won);
                events.push(SessionEvent::GameOver {
                    outcome: Outcome::Won,
                });
            }
        } else {
            events.push(SessionEvent::MatchFailed);
            self.pending_flip_back = Some(FlipBack {
                due_in_ms: FLIP_BACK_DELAY_MS,
                first,
                second,
                generation: self.generation,
            });
        }

        events
    }

    /// Advance the stopwatch and the flip-back countdown. Neither moves
    /// while the session is paused.
    fn drive<R: Rng>(&mut self, dt_ms: u64, _rng: &mut R) -> Vec<SessionEvent> {
        let events = Vec::new();
        if self.status != SessionStatus::Running {
            return events;
        }

        let dt = clamp_frame(dt_ms);
        self.elapsed_ms += dt;

        if let Some(flip_back) = self.pending_flip_back {
            if flip_back.generation != self.generation {
                // Scheduled against an earlier deck; drop it.
                self.pending_flip_back = None;
            } else if flip_back.due_in_ms <= dt {
                self.cards[flip_back.first].is_flipped = false;
                self.cards[flip_back.second].is_flipped = false;
                self.face_up.clear();
                self.pending_flip_back = None;
            } else {
                self.pending_flip_back = Some(FlipBack {
                    due_in_ms: flip_back.due_in_ms - dt,
                    ..flip_back
                });
            }
        }

        events
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
            "symbols".into(),
            snapshot::encode_list(self.cards.iter().map(|c| c.symbol_id)),
        );
        map.insert(
            "matched".into(),
            snapshot::encode_list(
                self.cards
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.is_matched)
                    .map(|(i, _)| i),
            ),
        );
        map.insert(
            "face_up".into(),
            snapshot::encode_list(self.face_up.iter().copied()),
        );
        map
    }

    fn restore(map: &SnapshotMap) -> Result<Self, SnapshotError> {
        let raw_difficulty = snapshot::require(map, "difficulty")?;
        let difficulty = Difficulty::from_tag(raw_difficulty)
            .ok_or_else(|| SnapshotError::malformed("difficulty", raw_difficulty))?;
        let policy = MemoryPolicy::for_difficulty(difficulty);

        let moves = snapshot::parse(map, "moves")?;
        let elapsed_ms = snapshot::parse(map, "elapsed_ms")?;
        let started: bool = snapshot::parse(map, "is_game_started")?;
        let paused: bool = snapshot::parse(map, "is_paused")?;

        let raw_symbols = snapshot::require(map, "symbols")?;
        let symbols: Vec<u8> = snapshot::decode_list("symbols", raw_symbols)?;
        if symbols.len() != policy.pairs as usize * 2 {
            return Err(SnapshotError::malformed("symbols", raw_symbols));
        }
        for symbol_id in 0..policy.pairs {
            if symbols.iter().filter(|&&s| s == symbol_id).count() != 2 {
                return Err(SnapshotError::malformed("symbols", raw_symbols));
            }
        }

        let raw_matched = snapshot::require(map, "matched")?;
        let matched: Vec<usize> = snapshot::decode_list("matched", raw_matched)?;
        let raw_face_up = snapshot::require(map, "face_up")?;
        let face_up: Vec<usize> = snapshot::decode_list("face_up", raw_face_up)?;
        if face_up.len() > 2 {
            return Err(SnapshotError::malformed("face_up", raw_face_up));
        }

        let mut cards: Vec<_> = symbols
            .into_iter()
            .map(|symbol_id| Card {
                symbol_id,
                is_flipped: false,
                is_matched: false,
            })
            .collect();
        for (i, &index) in matched.iter().enumerate() {
            if index >= cards.len() || matched[..i].contains(&index) {
                return Err(SnapshotError::malformed("matched", raw_matched));
            }
            cards[index].is_matched = true;
            cards[index].is_flipped = true;
        }
        for (i, &index) in face_up.iter().enumerate() {
            if index >= cards.len() || cards[index].is_matched || face_up[..i].contains(&index) {
                return Err(SnapshotError::malformed("face_up", raw_face_up));
            }
            cards[index].is_flipped = true;
        }

        let status = if !started {
            SessionStatus::NotStarted
        } else if paused {
            SessionStatus::Paused
        } else {
            SessionStatus::Running
        };

        // A saved session mid delay-window resumes with a fresh flip-back;
        // restarting the second is invisible next to a process restart.
        let pending_flip_back = (face_up.len() == 2).then(|| FlipBack {
            due_in_ms: FLIP_BACK_DELAY_MS,
            first: face_up[0],
            second: face_up[1],
            generation: 0,
        });

        Ok(Self {
            difficulty,
            status,
            outcome: None,
            cards,
            face_up,
            moves,
            elapsed_ms,
            pending_flip_back,
            generation: 0,
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
        ChaCha8Rng::seed_from_u64(21)
    }

    /// A game with a hand-laid deck `[A, B, A, B]` for deterministic pair
    /// scripts. Easy policy expects 6 pairs, so this bypasses `new` and the
    /// snapshot codec on purpose.
    fn scripted_game() -> MemoryGame {
        let mut game = MemoryGame::new(Difficulty::Easy, &mut rng());
        game.cards = [0u8, 1, 0, 1]
            .iter()
            .map(|&symbol_id| Card {
                symbol_id,
                is_flipped: false,
                is_matched: false,
            })
            .collect();
        game
    }

    #[test]
    fn test_first_flip_starts_clock() {
        let mut game = scripted_game();
        assert_eq!(game.status, SessionStatus::NotStarted);

        game.submit_input(0);

        assert_eq!(game.status, SessionStatus::Running);
        assert!(game.cards[0].is_flipped);
        assert_eq!(game.face_up, vec![0]);
        assert_eq!(game.moves, 0);
    }

    #[test]
    fn test_invalid_tap_does_not_start() {
        let mut game = scripted_game();
        game.submit_input(99);
        assert_eq!(game.status, SessionStatus::NotStarted);
    }

    #[test]
    fn test_matching_pair_script() {
        let mut game = scripted_game();
        let events: Vec<_> = game
            .submit_input(0)
            .into_iter()
            .chain(game.submit_input(2))
            .collect();

        assert!(game.cards[0].is_matched && game.cards[2].is_matched);
        assert!(game.face_up.is_empty());
        assert_eq!(game.moves, 1);
        assert_eq!(game.status, SessionStatus::Running);
        assert!(events.contains(&SessionEvent::MatchFound { symbol_id: 0 }));
    }

    #[test]
    fn test_completing_all_pairs_ends_session() {
        let mut game = scripted_game();
        game.submit_input(0);
        game.submit_input(2);
        game.submit_input(1);
        let events = game.submit_input(3);

        assert_eq!(game.status, SessionStatus::Over);
        assert_eq!(game.outcome, Some(Outcome::Won));
        assert_eq!(game.moves, 2);
        assert!(events.contains(&SessionEvent::GameOver {
            outcome: Outcome::Won
        }));
    }

    #[test]
    fn test_mismatch_schedules_flip_back() {
        let mut game = scripted_game();
        game.submit_input(0);
        let events = game.submit_input(1);

        assert_eq!(game.moves, 1);
        assert!(events.contains(&SessionEvent::MatchFailed));
        let flip_back = game.pending_flip_back.expect("flip-back scheduled");
        assert_eq!(flip_back.due_in_ms, FLIP_BACK_DELAY_MS);
        assert_eq!((flip_back.first, flip_back.second), (0, 1));
    }

    #[test]
    fn test_no_input_during_delay_window() {
        let mut game = scripted_game();
        game.submit_input(0);
        game.submit_input(1);

        // Third card refused while two are face-up.
        game.submit_input(2);
        assert!(!game.cards[2].is_flipped);
        assert_eq!(game.face_up.len(), 2);
        assert_eq!(game.moves, 1);
    }

    #[test]
    fn test_flip_back_fires_after_delay() {
        let mut game = scripted_game();
        game.submit_input(0);
        game.submit_input(1);

        // 600ms: not due yet.
        game.drive(300, &mut rng());
        game.drive(300, &mut rng());
        assert!(game.cards[0].is_flipped);

        // 1000ms total: due.
        game.drive(400, &mut rng());
        assert!(!game.cards[0].is_flipped);
        assert!(!game.cards[1].is_flipped);
        assert!(game.face_up.is_empty());
        assert!(game.pending_flip_back.is_none());

        // Input accepted again.
        game.submit_input(2);
        assert!(game.cards[2].is_flipped);
    }

    #[test]
    fn test_flip_back_frozen_while_paused() {
        let mut game = scripted_game();
        game.submit_input(0);
        game.submit_input(1);
        game.pause();

        game.drive(5_000, &mut rng());

        assert!(game.cards[0].is_flipped);
        assert_eq!(
            game.pending_flip_back.expect("still pending").due_in_ms,
            FLIP_BACK_DELAY_MS
        );

        game.resume();
        game.drive(500, &mut rng());
        game.drive(500, &mut rng());
        assert!(!game.cards[0].is_flipped);
    }

    #[test]
    fn test_stale_flip_back_is_discarded() {
        let mut game = scripted_game();
        game.submit_input(0);
        game.submit_input(1);

        // Reset mid delay-window; the new deck must stay untouched.
        game.reset(Difficulty::Easy, &mut rng());
        assert_eq!(game.generation, 1);
        assert!(game.pending_flip_back.is_none());

        // Even a flip-back value that survived a reset is generation-gated.
        game.pending_flip_back = Some(FlipBack {
            due_in_ms: 1,
            first: 0,
            second: 1,
            generation: 0,
        });
        game.submit_input(0);
        game.drive(100, &mut rng());
        assert!(game.pending_flip_back.is_none());
        assert!(game.cards[0].is_flipped, "new deck's flip must survive");
    }

    #[test]
    fn test_rejects_matched_flipped_and_paused_taps() {
        let mut game = scripted_game();
        game.submit_input(0);
        game.submit_input(2); // matched pair

        game.submit_input(0); // already matched
        assert!(game.face_up.is_empty());

        game.submit_input(1);
        game.submit_input(1); // already face-up
        assert_eq!(game.face_up, vec![1]);

        game.pause();
        game.submit_input(3);
        assert_eq!(game.face_up, vec![1]);
    }

    #[test]
    fn test_stopwatch_only_runs_while_running() {
        let mut game = scripted_game();
        game.drive(500, &mut rng());
        assert_eq!(game.elapsed_ms, 0, "NotStarted accumulates nothing");

        game.submit_input(0);
        game.drive(400, &mut rng());
        assert_eq!(game.elapsed_ms, 400);

        game.pause();
        game.drive(10_000, &mut rng());
        assert_eq!(game.elapsed_ms, 400);

        game.resume();
        game.drive(100, &mut rng());
        assert_eq!(game.elapsed_ms, 500);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut game = MemoryGame::new(Difficulty::Easy, &mut rng());
        // Match one real pair: find the partner of card 0.
        let symbol = game.cards[0].symbol_id;
        let partner = (1..game.cards.len())
            .find(|&i| game.cards[i].symbol_id == symbol)
            .expect("every symbol has a partner");
        game.submit_input(0);
        game.submit_input(partner);
        game.drive(2_300, &mut rng());

        let map = game.snapshot();
        let restored = MemoryGame::restore(&map).expect("well-formed record");
        assert_eq!(restored.snapshot(), map);

        assert_eq!(restored.status, SessionStatus::Running);
        assert_eq!(restored.moves, 1);
        assert_eq!(restored.elapsed_ms, game.elapsed_ms);
        assert!(restored.cards[0].is_matched);
        assert!(restored.cards[partner].is_matched);
    }

    #[test]
    fn test_restore_mid_delay_window_reschedules_flip_back() {
        let mut real = MemoryGame::new(Difficulty::Easy, &mut rng());
        let first = 0;
        let second = (1..real.cards.len())
            .find(|&i| real.cards[i].symbol_id != real.cards[first].symbol_id)
            .expect("some card differs");
        real.submit_input(first);
        real.submit_input(second);
        assert!(real.pending_flip_back.is_some());

        let restored = MemoryGame::restore(&real.snapshot()).expect("well-formed record");
        assert_eq!(restored.face_up, vec![first, second]);
        let flip_back = restored.pending_flip_back.expect("rescheduled");
        assert_eq!(flip_back.due_in_ms, FLIP_BACK_DELAY_MS);

        // And the window still rejects input.
        let mut restored = restored;
        let blocked = (0..restored.cards.len())
            .find(|&i| !restored.cards[i].is_flipped)
            .expect("face-down card exists");
        restored.submit_input(blocked);
        assert!(!restored.cards[blocked].is_flipped);
    }

    #[test]
    fn test_restore_rejects_malformed_records() {
        let mut game = MemoryGame::new(Difficulty::Easy, &mut rng());
        game.submit_input(0);
        let good = game.snapshot();

        let mut map = good.clone();
        map.insert("symbols".into(), "0,0,0,1,1,2".into());
        assert!(MemoryGame::restore(&map).is_err());

        let mut map = good.clone();
        map.insert("face_up".into(), "0,1,2".into());
        assert!(MemoryGame::restore(&map).is_err());

        let mut map = good.clone();
        map.insert("matched".into(), "99".into());
        assert!(MemoryGame::restore(&map).is_err());

        let mut map = good;
        map.remove("moves");
        assert!(MemoryGame::restore(&map).is_err());
    }

    #[test]
    fn test_record_best_tracks_time_and_moves_independently() {
        let mut game = scripted_game();
        game.status = SessionStatus::Over;
        game.outcome = Some(Outcome::Won);
        game.elapsed_ms = 60_000;
        game.moves = 10;

        let mut entry = LedgerEntry::default();
        assert!(game.record_best(&mut entry));
        assert_eq!(entry.best_time_ms, Some(60_000));
        assert_eq!(entry.best_moves, Some(10));

        // Faster but sloppier: only time improves.
        game.elapsed_ms = 45_000;
        game.moves = 14;
        assert!(game.record_best(&mut entry));
        assert_eq!(entry.best_time_ms, Some(45_000));
        assert_eq!(entry.best_moves, Some(10));

        // Neither improves.
        game.elapsed_ms = 50_000;
        game.moves = 12;
        assert!(!game.record_best(&mut entry));
    }
}
