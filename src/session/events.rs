//! Transient session events.
//!
//! Engines return these from `submit_input`/`drive` so the presentation
//! layer can play sounds and show notifications without the engine ever
//! touching UI types. Events are fire-and-forget: they describe what just
//! happened, never state to be read back.

use super::Outcome;

/// A single notification produced by a session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session reached a terminal condition.
    GameOver { outcome: Outcome },

    // ── Snake ───────────────────────────────────────────────────
    /// Food eaten; `score` is the new total.
    FoodEaten { score: u32 },
    /// The snake filled the whole grid; a forced win follows.
    BoardFull,

    // ── Breakout ────────────────────────────────────────────────
    /// A brick was destroyed; `score` is the new total.
    BrickDestroyed { score: u32 },
    /// The ball fell past the paddle.
    LifeLost { lives_left: u32 },
    /// All bricks cleared; `level` is the level just entered.
    LevelComplete { level: u32 },

    // ── Memory ──────────────────────────────────────────────────
    /// Two face-up cards matched.
    MatchFound { symbol_id: u8 },
    /// Two face-up cards did not match; the flip-back is scheduled.
    MatchFailed,

    // ── Quiz ────────────────────────────────────────────────────
    /// An answer was evaluated.
    AnswerJudged { correct: bool },
}
