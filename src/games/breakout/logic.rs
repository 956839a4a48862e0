//! Breakout session logic: paddle input, per-tick ball physics, brick and
//! life bookkeeping, and the snapshot codec.

use rand::Rng;

use super::types::{
    brick_points, generate_bricks, BreakoutGame, BreakoutPolicy, Brick, BOARD_HEIGHT, BOARD_WIDTH,
    BRICK_COLS, BRICK_ROWS, BRICK_TOP, BRICK_WIDTH, LEVEL_SPEED_FACTOR, MAX_LEVEL, PADDLE_Y,
    PHYSICS_TICK_MS,
};
use crate::session::snapshot::{self, SnapshotError, SnapshotMap};
use crate::session::timer::drain_ticks;
use crate::session::{
    Cell, Difficulty, GameKind, GameSession, LedgerEntry, Outcome, SessionEvent, SessionStatus,
    TickTimer,
};

/// UI-agnostic input for the paddle game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakoutInput {
    /// Move the paddle toward an absolute x position (already decoded from
    /// touch). Clamped to the board.
    MovePaddle(f64),
    /// Serve the ball; the qualifying input that starts the session.
    Launch,
}

impl GameSession for BreakoutGame {
    type Input = BreakoutInput;

    const KIND: GameKind = GameKind::Breakout;

    fn new_game<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        BreakoutGame::new(difficulty, rng)
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
        self.timer = Some(TickTimer::new(PHYSICS_TICK_MS));
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
        self.timer = Some(TickTimer::new(PHYSICS_TICK_MS));
    }

    /// Paddle moves are accepted before the serve so the player can line up
    /// the shot; only `Launch` starts the session.
    fn submit_input(&mut self, input: BreakoutInput) -> Vec<SessionEvent> {
        match self.status {
            SessionStatus::NotStarted => match input {
                BreakoutInput::MovePaddle(target) => self.move_paddle(target),
                BreakoutInput::Launch => self.start(),
            },
            SessionStatus::Running => {
                if let BreakoutInput::MovePaddle(target) = input {
                    self.move_paddle(target);
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
            step_ball(self, rng, &mut events);
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
        map.insert("paddle_x".into(), self.paddle_x.to_string());
        map.insert("ball_x".into(), self.ball_x.to_string());
        map.insert("ball_y".into(), self.ball_y.to_string());
        map.insert("ball_vx".into(), self.ball_vx.to_string());
        map.insert("ball_vy".into(), self.ball_vy.to_string());
        map.insert("ball_speed".into(), self.ball_speed.to_string());
        map.insert("lives".into(), self.lives.to_string());
        map.insert("level".into(), self.level.to_string());
        map.insert(
            "bricks".into(),
            snapshot::encode_cells(self.bricks.iter().map(|b| b.cell)),
        );
        map
    }

    fn restore(map: &SnapshotMap) -> Result<Self, SnapshotError> {
        let raw_difficulty = snapshot::require(map, "difficulty")?;
        let difficulty = Difficulty::from_tag(raw_difficulty)
            .ok_or_else(|| SnapshotError::malformed("difficulty", raw_difficulty))?;
        let policy = BreakoutPolicy::for_difficulty(difficulty);

        let score = snapshot::parse(map, "score")?;
        let tick_count = snapshot::parse(map, "tick_count")?;
        let started: bool = snapshot::parse(map, "is_game_started")?;
        let paused: bool = snapshot::parse(map, "is_paused")?;

        let paddle_x: f64 = parse_finite(map, "paddle_x")?;
        let ball_x: f64 = parse_finite(map, "ball_x")?;
        let ball_y: f64 = parse_finite(map, "ball_y")?;
        let ball_vx: f64 = parse_finite(map, "ball_vx")?;
        let ball_vy: f64 = parse_finite(map, "ball_vy")?;
        let ball_speed: f64 = parse_finite(map, "ball_speed")?;

        let lives: u32 = snapshot::parse(map, "lives")?;
        let level: u32 = snapshot::parse(map, "level")?;
        // A saved session is never terminal, so zero lives or an
        // out-of-range level is corruption, not state.
        if lives == 0 {
            return Err(SnapshotError::malformed("lives", "0"));
        }
        let raw_level = snapshot::require(map, "level")?;
        if level == 0 || level > MAX_LEVEL {
            return Err(SnapshotError::malformed("level", raw_level));
        }

        let raw_bricks = snapshot::require(map, "bricks")?;
        let cells = snapshot::decode_cells("bricks", raw_bricks)?;
        let mut bricks = Vec::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            let in_sheet =
                cell.x >= 0 && cell.x < BRICK_COLS && cell.y >= 0 && cell.y < BRICK_ROWS;
            if !in_sheet || cells[..i].contains(cell) {
                return Err(SnapshotError::malformed("bricks", raw_bricks));
            }
            bricks.push(Brick {
                cell: *cell,
                color_id: cell.y as u8,
            });
        }

        let status = if !started {
            SessionStatus::NotStarted
        } else if paused {
            SessionStatus::Paused
        } else {
            SessionStatus::Running
        };
        let timer = (status == SessionStatus::Running).then(|| TickTimer::new(PHYSICS_TICK_MS));

        Ok(Self {
            difficulty,
            status,
            outcome: None,
            paddle_x: paddle_x.clamp(0.0, BOARD_WIDTH - policy.paddle_width),
            paddle_width: policy.paddle_width,
            ball_x,
            ball_y,
            ball_vx,
            ball_vy,
            ball_speed,
            bricks,
            lives,
            level,
            score,
            tick_count,
            carry_ms: 0,
            timer,
        })
    }

    fn record_best(&self, entry: &mut LedgerEntry) -> bool {
        crate::session::ledger::improve_max_u32(&mut entry.best_score, self.score)
    }
}

impl BreakoutGame {
    fn move_paddle(&mut self, target: f64) {
        if !target.is_finite() {
            return;
        }
        self.paddle_x = target.clamp(0.0, BOARD_WIDTH - self.paddle_width);
    }
}

fn parse_finite(map: &SnapshotMap, field: &'static str) -> Result<f64, SnapshotError> {
    let value: f64 = snapshot::parse(map, field)?;
    if !value.is_finite() {
        return Err(SnapshotError::malformed(field, snapshot::require(map, field)?));
    }
    Ok(value)
}

/// One physics step: integrate, reflect, settle bricks and lives.
fn step_ball<R: Rng>(game: &mut BreakoutGame, rng: &mut R, events: &mut Vec<SessionEvent>) {
    game.tick_count += 1;

    let prev_x = game.ball_x;
    let prev_y = game.ball_y;
    let mut nx = prev_x + game.ball_vx;
    let mut ny = prev_y + game.ball_vy;

    // Side walls reflect x.
    if nx <= 0.0 {
        nx = 0.0;
        game.ball_vx = game.ball_vx.abs();
    } else if nx >= BOARD_WIDTH {
        nx = BOARD_WIDTH;
        game.ball_vx = -game.ball_vx.abs();
    }

    // Top wall reflects y.
    if ny <= 0.0 {
        ny = 0.0;
        game.ball_vy = game.ball_vy.abs();
    }

    // Paddle: reflects a descending ball crossing the paddle row while
    // horizontally on the paddle.
    if game.ball_vy > 0.0
        && prev_y <= PADDLE_Y
        && ny >= PADDLE_Y
        && nx >= game.paddle_x
        && nx <= game.paddle_x + game.paddle_width
    {
        ny = PADDLE_Y;
        game.ball_vy = -game.ball_vy.abs();
    }

    // Past the paddle and off the board: one life gone.
    if ny >= BOARD_HEIGHT {
        game.lives -= 1;
        events.push(SessionEvent::LifeLost {
            lives_left: game.lives,
        });
        if game.lives == 0 {
            finish(game, Outcome::Lost, events);
        } else {
            game.serve(rng);
        }
        return;
    }

    game.ball_x = nx;
    game.ball_y = ny;

    // Brick contact at the cell now containing the ball.
    let col = (nx / BRICK_WIDTH).floor() as i16;
    let row = (ny.floor() as i16) - BRICK_TOP;
    if (0..BRICK_COLS).contains(&col) && (0..BRICK_ROWS).contains(&row) {
        let cell = Cell { x: col, y: row };
        if let Some(index) = game.bricks.iter().position(|b| b.cell == cell) {
            let brick = game.bricks.swap_remove(index);
            game.score += brick_points(brick.color_id);
            events.push(SessionEvent::BrickDestroyed { score: game.score });

            // Reflect the component along which the ball entered the cell.
            let prev_col = (prev_x / BRICK_WIDTH).floor() as i16;
            let prev_row = (prev_y.floor() as i16) - BRICK_TOP;
            if prev_col != col && prev_row == row {
                game.ball_vx = -game.ball_vx;
            } else {
                game.ball_vy = -game.ball_vy;
            }
        }
    }

    // Sheet cleared: win at the last level, otherwise speed up and rebuild.
    if game.bricks.is_empty() {
        if game.level >= MAX_LEVEL {
            finish(game, Outcome::Won, events);
            return;
        }
        game.level += 1;
        game.ball_speed *= LEVEL_SPEED_FACTOR;
        game.bricks = generate_bricks();
        game.serve(rng);
        events.push(SessionEvent::LevelComplete { level: game.level });
    }
}

fn finish(game: &mut BreakoutGame, outcome: Outcome, events: &mut Vec<SessionEvent>) {
    game.status = SessionStatus::Over;
    game.outcome = Some(outcome);
    game.timer = None;
    events.push(SessionEvent::GameOver { outcome });
}
