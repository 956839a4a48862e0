//! Quiz mini-game.

pub mod logic;
pub mod types;

pub use types::{Question, QuizGame, QuizPolicy, ANSWER_POINTS, QUESTION_BANK};
