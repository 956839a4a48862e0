//! Sliding jigsaw puzzle data structures.
//!
//! A side x side board of numbered tiles with one blank. The shuffle is a
//! random walk of blank moves from the solved state, so every deal is
//! solvable by construction.

use rand::Rng;

use crate::session::{Difficulty, Outcome, SessionStatus};

/// Simulation parameters derived from difficulty. Pure data, no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzlePolicy {
    /// Board side length.
    pub side: u8,
}

impl PuzzlePolicy {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self { side: 3 },
            Difficulty::Medium => Self { side: 4 },
            Difficulty::Hard => Self { side: 5 },
        }
    }
}

/// Board indices 4-adjacent to `index` on a side x side board.
pub fn neighbors(index: usize, side: u8) -> Vec<usize> {
    let side = side as usize;
    let (row, col) = (index / side, index % side);
    let mut out = Vec::with_capacity(4);
    if row > 0 {
        out.push(index - side);
    }
    if row + 1 < side {
        out.push(index + side);
    }
    if col > 0 {
        out.push(index - 1);
    }
    if col + 1 < side {
        out.push(index + 1);
    }
    out
}

/// True when the two indices are 4-adjacent on a side x side board.
pub fn is_adjacent(a: usize, b: usize, side: u8) -> bool {
    neighbors(a, side).contains(&b)
}

/// Tile order of the solved board: `1..n` then the blank (0) last.
pub fn solved_tiles(side: u8) -> Vec<u8> {
    let n = side as usize * side as usize;
    (1..n as u8).chain(std::iter::once(0)).collect()
}

/// Main session state for the sliding puzzle.
#[derive(Debug, Clone)]
pub struct PuzzleGame {
    pub difficulty: Difficulty,
    pub status: SessionStatus,
    pub outcome: Option<Outcome>,

    /// Board side length (cached from difficulty).
    pub side: u8,
    /// Tile values in board order; 0 is the blank.
    pub tiles: Vec<u8>,

    pub moves: u32,
    /// Display stopwatch; accumulates only while running.
    pub elapsed_ms: u64,
}

impl PuzzleGame {
    /// Create a fresh session with a shuffled, solvable board.
    pub fn new<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        let policy = PuzzlePolicy::for_difficulty(difficulty);
        let tiles = shuffled_board(policy.side, rng);

        Self {
            difficulty,
            status: SessionStatus::NotStarted,
            outcome: None,
            side: policy.side,
            tiles,
            moves: 0,
            elapsed_ms: 0,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.tiles == solved_tiles(self.side)
    }

    pub fn blank_index(&self) -> usize {
        self.tiles
            .iter()
            .position(|&t| t == 0)
            .unwrap_or(self.tiles.len() - 1)
    }
}

/// Random-walk shuffle from the solved state. Re-walks in the (vanishing)
/// case the walk lands back on the solved order.
fn shuffled_board<R: Rng>(side: u8, rng: &mut R) -> Vec<u8> {
    let n = side as usize * side as usize;
    let solved = solved_tiles(side);
    let steps = n * n * 8;

    loop {
        let mut tiles = solved.clone();
        let mut blank = n - 1;
        for _ in 0..steps {
            let options = neighbors(blank, side);
            let next = options[rng.gen_range(0..options.len())];
            tiles.swap(blank, next);
            blank = next;
        }
        if tiles != solved {
            return tiles;
        }
    }
}
