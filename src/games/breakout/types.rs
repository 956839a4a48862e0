//! Brick-breaking paddle game data structures.
//!
//! Finer-grained than the grid games: ball and paddle move in sub-cell
//! floating-point coordinates on a fixed logical board.

use rand::Rng;

use crate::session::placement::Cell;
use crate::session::{Difficulty, Outcome, SessionStatus, TickTimer};

/// Logical board dimensions.
pub const BOARD_WIDTH: f64 = 40.0;
pub const BOARD_HEIGHT: f64 = 30.0;

/// Row (y) at which the paddle sits.
pub const PADDLE_Y: f64 = 28.0;

/// Brick sheet: columns x rows of unit-height bricks starting at
/// [`BRICK_TOP`]. Brick width is `BOARD_WIDTH / BRICK_COLS`.
pub const BRICK_COLS: i16 = 10;
pub const BRICK_ROWS: i16 = 6;
pub const BRICK_TOP: i16 = 3;
pub const BRICK_WIDTH: f64 = BOARD_WIDTH / BRICK_COLS as f64;

/// Clearing this level wins the session outright.
pub const MAX_LEVEL: u32 = 5;

/// Ball speed multiplier applied at each level-up.
pub const LEVEL_SPEED_FACTOR: f64 = 1.15;

/// Physics step interval in milliseconds.
pub const PHYSICS_TICK_MS: u64 = 16;

/// Points for destroying a brick of the given color row (0 = top row,
/// worth the most).
pub fn brick_points(color_id: u8) -> u32 {
    (BRICK_ROWS as u32).saturating_sub(color_id as u32) * 10
}

/// Simulation parameters derived from difficulty. Pure data, no state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakoutPolicy {
    /// Ball speed magnitude in board units per physics tick.
    pub ball_speed: f64,
    pub paddle_width: f64,
    pub lives: u32,
}

impl BreakoutPolicy {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                ball_speed: 0.28,
                paddle_width: 8.0,
                lives: 5,
            },
            Difficulty::Medium => Self {
                ball_speed: 0.36,
                paddle_width: 6.0,
                lives: 4,
            },
            Difficulty::Hard => Self {
                ball_speed: 0.45,
                paddle_width: 5.0,
                lives: 3,
            },
        }
    }
}

/// One brick on the sheet. `cell` is in sheet coordinates (column, row);
/// board y of a brick is `BRICK_TOP + row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brick {
    pub cell: Cell,
    pub color_id: u8,
}

/// Full brick sheet for a level. Layout is the same every level; levels
/// differ by ball speed.
pub fn generate_bricks() -> Vec<Brick> {
    let mut bricks = Vec::with_capacity((BRICK_COLS * BRICK_ROWS) as usize);
    for row in 0..BRICK_ROWS {
        for col in 0..BRICK_COLS {
            bricks.push(Brick {
                cell: Cell { x: col, y: row },
                color_id: row as u8,
            });
        }
    }
    bricks
}

/// Main session state for the paddle game.
#[derive(Debug, Clone)]
pub struct BreakoutGame {
    pub difficulty: Difficulty,
    pub status: SessionStatus,
    pub outcome: Option<Outcome>,

    pub paddle_x: f64,
    /// Cached from difficulty.
    pub paddle_width: f64,

    pub ball_x: f64,
    pub ball_y: f64,
    pub ball_vx: f64,
    pub ball_vy: f64,
    /// Current speed magnitude; grows with each level.
    pub ball_speed: f64,

    pub bricks: Vec<Brick>,
    pub lives: u32,
    pub level: u32,
    pub score: u32,

    /// Physics steps since the session started.
    pub tick_count: u64,
    /// Sub-interval frame-time accumulator. Survives pause/resume.
    pub carry_ms: u64,
    /// Armed while and only while the session is running.
    pub timer: Option<TickTimer>,
}

impl BreakoutGame {
    pub fn new<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        let policy = BreakoutPolicy::for_difficulty(difficulty);
        let mut game = Self {
            difficulty,
            status: SessionStatus::NotStarted,
            outcome: None,

            paddle_x: 0.0,
            paddle_width: policy.paddle_width,

            ball_x: 0.0,
            ball_y: 0.0,
            ball_vx: 0.0,
            ball_vy: 0.0,
            ball_speed: policy.ball_speed,

            bricks: generate_bricks(),
            lives: policy.lives,
            level: 1,
            score: 0,

            tick_count: 0,
            carry_ms: 0,
            timer: None,
        };
        game.serve(rng);
        game
    }

    /// Center the paddle, put the ball just above it, and launch upward at
    /// the current speed with a random horizontal direction.
    pub fn serve<R: Rng>(&mut self, rng: &mut R) {
        self.paddle_x = (BOARD_WIDTH - self.paddle_width) / 2.0;
        self.ball_x = BOARD_WIDTH / 2.0;
        self.ball_y = PADDLE_Y - 1.0;

        let component = self.ball_speed * std::f64::consts::FRAC_1_SQRT_2;
        let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
        self.ball_vx = component * sign;
        self.ball_vy = -component;
    }
}
