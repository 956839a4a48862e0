//! Snake session logic: buffered heading input, per-step simulation,
//! terminal detection, and the snapshot codec.

use rand::Rng;

use super::types::{Direction, SnakeGame, SnakePolicy, FOOD_POINTS};
use crate::session::placement::random_free_cell;
use crate::session::snapshot::{self, SnapshotError, SnapshotMap};
use crate::session::timer::drain_ticks;
use crate::session::{
    Cell, Difficulty, GameKind, GameSession, LedgerEntry, Outcome, SessionEvent, SessionStatus,
    TickTimer,
};

impl GameSession for SnakeGame {
    type Input = Direction;

    const KIND: GameKind = GameKind::Snake;

    fn new_game<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        SnakeGame::new(difficulty, rng)
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
        self.timer = Some(TickTimer::new(self.move_interval_ms));
    }

    fn pause(&mut self) {
        if self.status != SessionStatus::Running {
            return;
        }
        self.timer = None;
        self.status = SessionStatus::Paused;
    }

    fn resume(&mut self) {
        if self.status != SessionStatus::Paused {
            return;
        }
        self.status = SessionStatus::Running;
        self.timer = Some(TickTimer::new(self.move_interval_ms));
    }

    /// Buffer a heading change. A 180° reversal of the current heading is
    /// refused here, at submit time. A heading received before the first
    /// start is a qualifying input: it buffers and implicitly starts the
    /// session (a refused reversal does not).
    fn submit_input(&mut self, heading: Direction) -> Vec<SessionEvent> {
        match self.status {
            SessionStatus::NotStarted | SessionStatus::Running => {
                if heading != self.heading.opposite() {
                    self.pending_heading = heading;
                    self.start();
                }
            }
            SessionStatus::Paused | SessionStatus::Over => {}
        }
        Vec::new()
    }

    fn drive<R: Rng>(&mut self, dt_ms: u64, rng: &mut R) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.status != SessionStatus::Running {
            return events;
        }
        let Some(timer) = self.timer else {
            return events;
        };

        let steps = drain_ticks(&mut self.carry_ms, dt_ms, timer.interval_ms());
        for _ in 0..steps {
            step_snake(self, rng, &mut events);
            if self.status == SessionStatus::Over {
                break;
            }
        }
        events
    }

    fn snapshot(&self) -> SnapshotMap {
        let mut map = SnapshotMap::new();
        map.insert("difficulty".into(), self.difficulty.as_str().into());
        map.insert("score".into(), self.score.to_string());
        map.insert("tick_count".into(), self.tick_count.to_string());
        map.insert(
            "is_game_started".into(),
            self.status.is_game_started().to_string(),
        );
        map.insert("is_paused".into(), self.status.is_paused().to_string());
        map.insert(
            "body".into(),
            snapshot::encode_cells(self.body.iter().copied()),
        );
        map.insert("heading".into(), self.heading.as_str().into());
        map.insert("pending_heading".into(), self.pending_heading.as_str().into());
        map.insert(
            "food".into(),
            format!("{},{}", self.food.x, self.food.y),
        );
        map
    }

    fn restore(map: &SnapshotMap) -> Result<Self, SnapshotError> {
        let raw_difficulty = snapshot::require(map, "difficulty")?;
        let difficulty = Difficulty::from_tag(raw_difficulty)
            .ok_or_else(|| SnapshotError::malformed("difficulty", raw_difficulty))?;
        let policy = SnakePolicy::for_difficulty(difficulty);

        let score = snapshot::parse(map, "score")?;
        let tick_count = snapshot::parse(map, "tick_count")?;
        let started: bool = snapshot::parse(map, "is_game_started")?;
        let paused: bool = snapshot::parse(map, "is_paused")?;

        let raw_body = snapshot::require(map, "body")?;
        let body_cells = snapshot::decode_cells("body", raw_body)?;
        if body_cells.len() < 3 {
            return Err(SnapshotError::malformed("body", raw_body));
        }
        for (i, cell) in body_cells.iter().enumerate() {
            let in_bounds =
                cell.x >= 0 && cell.x < policy.grid_size && cell.y >= 0 && cell.y < policy.grid_size;
            if !in_bounds || body_cells[..i].contains(cell) {
                return Err(SnapshotError::malformed("body", raw_body));
            }
        }

        let raw_food = snapshot::require(map, "food")?;
        let food = snapshot::decode_cell("food", raw_food)?;
        if food.x < 0
            || food.x >= policy.grid_size
            || food.y < 0
            || food.y >= policy.grid_size
            || body_cells.contains(&food)
        {
            return Err(SnapshotError::malformed("food", raw_food));
        }

        let raw_heading = snapshot::require(map, "heading")?;
        let heading = Direction::from_tag(raw_heading)
            .ok_or_else(|| SnapshotError::malformed("heading", raw_heading))?;
        let raw_pending = snapshot::require(map, "pending_heading")?;
        let pending_heading = Direction::from_tag(raw_pending)
            .ok_or_else(|| SnapshotError::malformed("pending_heading", raw_pending))?;

        let status = if !started {
            SessionStatus::NotStarted
        } else if paused {
            SessionStatus::Paused
        } else {
            SessionStatus::Running
        };
        let timer =
            (status == SessionStatus::Running).then(|| TickTimer::new(policy.move_interval_ms));

        Ok(Self {
            difficulty,
            status,
            outcome: None,
            board_full: false,
            grid_size: policy.grid_size,
            body: body_cells.into(),
            heading,
            pending_heading,
            food,
            score,
            tick_count,
            move_interval_ms: policy.move_interval_ms,
            carry_ms: 0,
            timer,
        })
    }

    fn record_best(&self, entry: &mut LedgerEntry) -> bool {
        crate::session::ledger::improve_max_u32(&mut entry.best_score, self.score)
    }
}

/// One simulation step.
fn step_snake<R: Rng>(game: &mut SnakeGame, rng: &mut R, events: &mut Vec<SessionEvent>) {
    game.tick_count += 1;

    // Reversals were refused at submit time, so the buffered heading is
    // always adoptable.
    game.heading = game.pending_heading;

    let (dx, dy) = game.heading.delta();
    let head = game.body[0];
    let new_head = Cell {
        x: head.x + dx,
        y: head.y + dy,
    };

    // Wall collision. No wrapping: off-edge is always terminal.
    if new_head.x < 0
        || new_head.x >= game.grid_size
        || new_head.y < 0
        || new_head.y >= game.grid_size
    {
        finish(game, Outcome::Lost, events);
        return;
    }

    // Self collision: when eating, the tail stays so the full body is
    // checked; otherwise the tail vacates this step and is excluded
    // (tail-chasing is legal).
    let eating = new_head == game.food;
    let collision_range = if eating {
        game.body.len()
    } else {
        game.body.len() - 1
    };
    if game
        .body
        .iter()
        .take(collision_range)
        .any(|&seg| seg == new_head)
    {
        finish(game, Outcome::Lost, events);
        return;
    }

    game.body.push_front(new_head);

    if eating {
        game.score += FOOD_POINTS;
        events.push(SessionEvent::FoodEaten { score: game.score });

        match random_free_cell(rng, game.grid_size, game.grid_size, |c| {
            game.body.contains(&c)
        }) {
            Some(cell) => game.food = cell,
            None => {
                // Grid fully occupied: nowhere left to place food, so the
                // board is won.
                game.board_full = true;
                events.push(SessionEvent::BoardFull);
                finish(game, Outcome::Won, events);
            }
        }
    } else {
        game.body.pop_back();
    }
}

fn finish(game: &mut SnakeGame, outcome: Outcome, events: &mut Vec<SessionEvent>) {
    game.status = SessionStatus::Over;
    game.outcome = Some(outcome);
    game.timer = None;
    events.push(SessionEvent::GameOver { outcome });
}
