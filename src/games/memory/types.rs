//! Tile-matching memory game data structures.
//!
//! Event-driven: there is no simulation timer, only a display stopwatch and
//! a one-shot delayed flip-back for mismatched pairs.

use rand::Rng;

use crate::session::placement::shuffle;
use crate::session::{Difficulty, Outcome, SessionStatus};

/// Delay before a mismatched pair flips back face-down.
pub const FLIP_BACK_DELAY_MS: u64 = 1000;

/// Simulation parameters derived from difficulty. Pure data, no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryPolicy {
    /// Number of symbol pairs in the deck.
    pub pairs: u8,
}

impl MemoryPolicy {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self { pairs: 6 },
            Difficulty::Medium => Self { pairs: 8 },
            Difficulty::Hard => Self { pairs: 10 },
        }
    }
}

/// One card in the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub symbol_id: u8,
    pub is_flipped: bool,
    pub is_matched: bool,
}

/// Scheduled flip-back of a mismatched pair. Captures the generation it was
/// scheduled under so a reset in the delay window strands it harmlessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipBack {
    pub due_in_ms: u64,
    pub first: usize,
    pub second: usize,
    pub generation: u64,
}

/// Main session state for the memory game.
#[derive(Debug, Clone)]
pub struct MemoryGame {
    pub difficulty: Difficulty,
    pub status: SessionStatus,
    pub outcome: Option<Outcome>,

    /// The deck; each symbol id appears exactly twice.
    pub cards: Vec<Card>,
    /// Indices currently face-up and unmatched, in flip order. Never more
    /// than two.
    pub face_up: Vec<usize>,
    /// Completed pair evaluations (match or mismatch).
    pub moves: u32,

    /// Display stopwatch; accumulates only while running.
    pub elapsed_ms: u64,

    pub pending_flip_back: Option<FlipBack>,
    /// Bumped by every reset; deferred actions check it before applying.
    pub generation: u64,
}

impl MemoryGame {
    /// Create a fresh session with a shuffled deck.
    pub fn new<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        let policy = MemoryPolicy::for_difficulty(difficulty);

        let mut cards: Vec<Card> = (0..policy.pairs)
            .flat_map(|symbol_id| {
                [
                    Card {
                        symbol_id,
                        is_flipped: false,
                        is_matched: false,
                    };
                    2
                ]
            })
            .collect();
        shuffle(rng, &mut cards);

        Self {
            difficulty,
            status: SessionStatus::NotStarted,
            outcome: None,
            cards,
            face_up: Vec::new(),
            moves: 0,
            elapsed_ms: 0,
            pending_flip_back: None,
            generation: 0,
        }
    }
}
