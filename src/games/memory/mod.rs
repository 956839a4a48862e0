//! Tile-matching memory mini-game.

pub mod logic;
pub mod types;

pub use types::{Card, FlipBack, MemoryGame, MemoryPolicy, FLIP_BACK_DELAY_MS};
