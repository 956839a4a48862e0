//! Quiz mini-game data structures.
//!
//! A fixed question bank; each session draws a shuffled, difficulty-sized
//! subset. Event-driven like the memory game: no simulation timer, just a
//! display stopwatch.

use rand::Rng;

use crate::session::placement::shuffle;
use crate::session::{Difficulty, Outcome, SessionStatus};

/// Points per correct answer.
pub const ANSWER_POINTS: u32 = 10;

/// Number of answer choices per question.
pub const CHOICES: usize = 4;

/// One question in the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub prompt: &'static str,
    pub choices: [&'static str; CHOICES],
    /// Index of the correct choice.
    pub answer: u8,
}

/// The static question bank. Household-and-nature trivia pitched at the
/// app's audience.
pub const QUESTION_BANK: &[Question] = &[
    Question {
        prompt: "Which of these goes in the recycling bin?",
        choices: ["Banana peel", "Glass bottle", "Used tissue", "Old sock"],
        answer: 1,
    },
    Question {
        prompt: "What do you use to sweep the floor?",
        choices: ["A spoon", "A pillow", "A broom", "A whisk"],
        answer: 2,
    },
    Question {
        prompt: "Where should dirty clothes go?",
        choices: ["Under the bed", "The laundry basket", "The fridge", "The bathtub"],
        answer: 1,
    },
    Question {
        prompt: "How many legs does a spider have?",
        choices: ["Four", "Six", "Eight", "Ten"],
        answer: 2,
    },
    Question {
        prompt: "Which room is the oven usually in?",
        choices: ["The kitchen", "The garage", "The bathroom", "The hallway"],
        answer: 0,
    },
    Question {
        prompt: "What do plants need to grow?",
        choices: ["Ice cream", "Water and light", "Television", "Blankets"],
        answer: 1,
    },
    Question {
        prompt: "When should you wash your hands?",
        choices: [
            "Before eating",
            "Only on weekends",
            "Once a month",
            "Never",
        ],
        answer: 0,
    },
    Question {
        prompt: "Which of these is a fruit?",
        choices: ["Carrot", "Potato", "Apple", "Onion"],
        answer: 2,
    },
    Question {
        prompt: "What melts when it gets warm?",
        choices: ["A rock", "An ice cube", "A fork", "A towel"],
        answer: 1,
    },
    Question {
        prompt: "Where does milk belong after breakfast?",
        choices: ["The cupboard", "The windowsill", "The fridge", "The oven"],
        answer: 2,
    },
    Question {
        prompt: "How many days are in one week?",
        choices: ["Five", "Six", "Seven", "Eight"],
        answer: 2,
    },
    Question {
        prompt: "Which animal says 'moo'?",
        choices: ["A cow", "A cat", "A duck", "A dog"],
        answer: 0,
    },
    Question {
        prompt: "What do you put on a toothbrush?",
        choices: ["Soap", "Toothpaste", "Shampoo", "Honey"],
        answer: 1,
    },
    Question {
        prompt: "Which season is usually the coldest?",
        choices: ["Summer", "Spring", "Autumn", "Winter"],
        answer: 3,
    },
];

/// Simulation parameters derived from difficulty. Pure data, no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizPolicy {
    /// Questions per session.
    pub question_count: usize,
}

impl QuizPolicy {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self { question_count: 5 },
            Difficulty::Medium => Self { question_count: 8 },
            Difficulty::Hard => Self { question_count: 12 },
        }
    }
}

/// Main session state for the quiz.
#[derive(Debug, Clone)]
pub struct QuizGame {
    pub difficulty: Difficulty,
    pub status: SessionStatus,
    pub outcome: Option<Outcome>,

    /// Bank indices in play order for this session.
    pub order: Vec<u8>,
    /// Position in `order` of the question being asked.
    pub current: usize,
    pub score: u32,
    pub correct: u32,

    /// Display stopwatch; accumulates only while running.
    pub elapsed_ms: u64,
}

impl QuizGame {
    /// Create a fresh session with a shuffled question draw.
    pub fn new<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        let policy = QuizPolicy::for_difficulty(difficulty);

        let mut indices: Vec<u8> = (0..QUESTION_BANK.len() as u8).collect();
        shuffle(rng, &mut indices);
        indices.truncate(policy.question_count);

        Self {
            difficulty,
            status: SessionStatus::NotStarted,
            outcome: None,
            order: indices,
            current: 0,
            score: 0,
            correct: 0,
            elapsed_ms: 0,
        }
    }

    /// The question currently being asked, `None` once the session is over.
    pub fn current_question(&self) -> Option<&'static Question> {
        let bank_index = *self.order.get(self.current)? as usize;
        QUESTION_BANK.get(bank_index)
    }
}
