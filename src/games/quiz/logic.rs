//! Quiz session logic: answer evaluation, completion, and the snapshot
//! codec.

use rand::Rng;

use super::types::{QuizGame, QuizPolicy, ANSWER_POINTS, CHOICES, QUESTION_BANK};
use crate::session::ledger::improve_max_u32;
use crate::session::snapshot::{self, SnapshotError, SnapshotMap};
use crate::session::timer::clamp_frame;
use crate::session::{
    Difficulty, GameKind, GameSession, LedgerEntry, Outcome, SessionEvent, SessionStatus,
};

impl GameSession for QuizGame {
    type Input = u8;

    const KIND: GameKind = GameKind::Quiz;

    fn new_game<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        QuizGame::new(difficulty, rng)
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

    /// Answer the current question with choice `input`. The first valid
    /// answer starts the clock; answering the last question ends the
    /// session.
    fn submit_input(&mut self, choice: u8) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if matches!(self.status, SessionStatus::Paused | SessionStatus::Over) {
            return events;
        }
        if (choice as usize) >= CHOICES {
            return events;
        }
        let Some(question) = self.current_question() else {
            return events;
        };

        self.start();

        let correct = question.answer == choice;
        if correct {
            self.score += ANSWER_POINTS;
            self.correct += 1;
        }
        events.push(SessionEvent::AnswerJudged { correct });

        self.current += 1;
        if self.current >= self.order.len() {
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
        map.insert("score".into(), self.score.to_string());
        map.insert("correct".into(), self.correct.to_string());
        map.insert("current".into(), self.current.to_string());
        map.insert("elapsed_ms".into(), self.elapsed_ms.to_string());
        map.insert(
            "is_game_started".into(),
            self.status.is_game_started().to_string(),
        );
        map.insert("is_paused".into(), self.status.is_paused().to_string());
        map.insert(
            "order".into(),
            snapshot::encode_list(self.order.iter().copied()),
        );
        map
    }

    fn restore(map: &SnapshotMap) -> Result<Self, SnapshotError> {
        let raw_difficulty = snapshot::require(map, "difficulty")?;
        let difficulty = Difficulty::from_tag(raw_difficulty)
            .ok_or_else(|| SnapshotError::malformed("difficulty", raw_difficulty))?;
        let policy = QuizPolicy::for_difficulty(difficulty);

        let score = snapshot::parse(map, "score")?;
        let correct = snapshot::parse(map, "correct")?;
        let current: usize = snapshot::parse(map, "current")?;
        let elapsed_ms = snapshot::parse(map, "elapsed_ms")?;
        let started: bool = snapshot::parse(map, "is_game_started")?;
        let paused: bool = snapshot::parse(map, "is_paused")?;

        let raw_order = snapshot::require(map, "order")?;
        let order: Vec<u8> = snapshot::decode_list("order", raw_order)?;
        if order.len() != policy.question_count {
            return Err(SnapshotError::malformed("order", raw_order));
        }
        for (i, &bank_index) in order.iter().enumerate() {
            if (bank_index as usize) >= QUESTION_BANK.len() || order[..i].contains(&bank_index) {
                return Err(SnapshotError::malformed("order", raw_order));
            }
        }
        // A saved session is never terminal, so the cursor must still point
        // at a question.
        if current >= order.len() {
            return Err(SnapshotError::malformed(
                "current",
                snapshot::require(map, "current")?,
            ));
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
            order,
            current,
            score,
            correct,
            elapsed_ms,
        })
    }

    fn record_best(&self, entry: &mut LedgerEntry) -> bool {
        improve_max_u32(&mut entry.best_score, self.score)
    }
}
