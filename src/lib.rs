//! Chorequest — resumable mini-game session engine.
//!
//! The arcade mini-games embedded in the chore rewards app: a per-game
//! state machine that advances on a private clock, buffers player input,
//! detects terminal conditions, and survives process suspension through
//! flat-record snapshots. Rendering, input decoding, sound, and app
//! lifecycle live outside this crate; they talk to a session only through
//! its controller and read state back through the public session fields.

pub mod games;
pub mod session;

pub use games::breakout::{BreakoutGame, BreakoutInput};
pub use games::memory::MemoryGame;
pub use games::puzzle::PuzzleGame;
pub use games::quiz::QuizGame;
pub use games::snake::{Direction, SnakeGame};
pub use session::{
    Difficulty, FileStore, GameKind, GameSession, KvStore, LedgerEntry, MemoryStore, Outcome,
    ScoreLedger, SessionController, SessionEvent, SessionStatus,
};
