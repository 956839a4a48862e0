//! Grid-crawling snake data structures.
//!
//! The snake crosses a square grid eating food; going off the edge or into
//! itself ends the session. Growth is unbounded — filling the whole grid is
//! the forced-win terminal condition.

use std::collections::VecDeque;

use rand::Rng;

use crate::session::placement::{random_free_cell, Cell};
use crate::session::{Difficulty, Outcome, SessionStatus, TickTimer};

/// Points awarded per food eaten.
pub const FOOD_POINTS: u32 = 10;

/// Simulation parameters derived from difficulty. Pure data, no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnakePolicy {
    /// Side length of the square grid.
    pub grid_size: i16,
    /// Simulation step interval in milliseconds (lower = faster).
    pub move_interval_ms: u64,
}

impl SnakePolicy {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                grid_size: 16,
                move_interval_ms: 250,
            },
            Difficulty::Medium => Self {
                grid_size: 20,
                move_interval_ms: 180,
            },
            Difficulty::Hard => Self {
                grid_size: 24,
                move_interval_ms: 120,
            },
        }
    }
}

/// Cardinal heading for snake movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Returns the (dx, dy) delta for this heading.
    pub fn delta(&self) -> (i16, i16) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Stable string tag for persisted records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Main session state for the snake game.
#[derive(Debug, Clone)]
pub struct SnakeGame {
    pub difficulty: Difficulty,
    pub status: SessionStatus,
    pub outcome: Option<Outcome>,
    /// Set when the session ended because the snake filled the grid.
    pub board_full: bool,

    /// Side length of the square grid (cached from difficulty).
    pub grid_size: i16,

    /// Body segments, head first. Length never drops below 3.
    pub body: VecDeque<Cell>,
    /// Heading adopted by the last simulation step.
    pub heading: Direction,
    /// Buffered heading for the next step. Reversals are refused at submit
    /// time, so this is always adoptable.
    pub pending_heading: Direction,

    pub food: Cell,

    pub score: u32,

    /// Simulation steps since the session started.
    pub tick_count: u64,
    /// Step interval in milliseconds (cached from difficulty).
    pub move_interval_ms: u64,
    /// Sub-interval frame-time accumulator. Survives pause/resume.
    pub carry_ms: u64,
    /// Armed while and only while the session is running.
    pub timer: Option<TickTimer>,
}

impl SnakeGame {
    /// Create a fresh session: 3 segments in the grid center, heading right,
    /// food placed on a random free cell.
    pub fn new<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        let policy = SnakePolicy::for_difficulty(difficulty);
        let center = policy.grid_size / 2;

        let mut body = VecDeque::new();
        body.push_back(Cell { x: center, y: center });
        body.push_back(Cell {
            x: center - 1,
            y: center,
        });
        body.push_back(Cell {
            x: center - 2,
            y: center,
        });

        let food = random_free_cell(rng, policy.grid_size, policy.grid_size, |c| {
            body.contains(&c)
        })
        .unwrap_or(Cell { x: 0, y: 0 });

        Self {
            difficulty,
            status: SessionStatus::NotStarted,
            outcome: None,
            board_full: false,

            grid_size: policy.grid_size,

            body,
            heading: Direction::Right,
            pending_heading: Direction::Right,

            food,

            score: 0,

            tick_count: 0,
            move_interval_ms: policy.move_interval_ms,
            carry_ms: 0,
            timer: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_new_game_defaults() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let game = SnakeGame::new(Difficulty::Medium, &mut rng);
        assert_eq!(game.status, SessionStatus::NotStarted);
        assert_eq!(game.outcome, None);
        assert!(!game.board_full);
        assert_eq!(game.score, 0);
        assert_eq!(game.tick_count, 0);
        assert_eq!(game.body.len(), 3);
        assert_eq!(game.heading, Direction::Right);
        assert_eq!(game.pending_heading, Direction::Right);
        assert!(game.timer.is_none());
    }

    #[test]
    fn test_initial_body_centered() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let game = SnakeGame::new(Difficulty::Medium, &mut rng);
        // Medium grid is 20, so the head sits at (10, 10) and the body
        // extends left.
        assert_eq!(game.body[0], Cell { x: 10, y: 10 });
        assert_eq!(game.body[1], Cell { x: 9, y: 10 });
        assert_eq!(game.body[2], Cell { x: 8, y: 10 });
    }

    #[test]
    fn test_food_not_on_body() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let game = SnakeGame::new(Difficulty::Easy, &mut rng);
            assert!(!game.body.contains(&game.food));
            assert!(game.food.x >= 0 && game.food.x < game.grid_size);
            assert!(game.food.y >= 0 && game.food.y < game.grid_size);
        }
    }

    #[test]
    fn test_policy_parameters() {
        assert_eq!(
            SnakePolicy::for_difficulty(Difficulty::Easy),
            SnakePolicy {
                grid_size: 16,
                move_interval_ms: 250
            }
        );
        assert_eq!(
            SnakePolicy::for_difficulty(Difficulty::Medium),
            SnakePolicy {
                grid_size: 20,
                move_interval_ms: 180
            }
        );
        assert_eq!(
            SnakePolicy::for_difficulty(Difficulty::Hard),
            SnakePolicy {
                grid_size: 24,
                move_interval_ms: 120
            }
        );
    }

    #[test]
    fn test_direction_opposites() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
    }

    #[test]
    fn test_direction_tags_round_trip() {
        for d in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            assert_eq!(Direction::from_tag(d.as_str()), Some(d));
        }
        assert_eq!(Direction::from_tag("north"), None);
    }
}
