//! Answer evaluation for learning sessions.

use crate::types::{LearningMode, LearningResult, Word};

/// Case-insensitive exact comparison. Whitespace is significant.
pub fn answers_match(submitted: &str, expected: &str) -> bool {
    submitted
        .chars()
        .flat_map(char::to_lowercase)
        .eq(expected.chars().flat_map(char::to_lowercase))
}

/// Judge a submitted answer against the word's translation.
pub fn evaluate(word: &Word, submitted: &str) -> LearningResult {
    LearningResult {
        is_correct: answers_match(submitted, &word.translation),
        correct_answer: word.translation.clone(),
        user_answer: submitted.to_string(),
    }
}

impl LearningMode {
    /// Evaluate an answer given in this mode.
    ///
    /// All modes grade the same way; they differ only in how the question is shown.
    pub fn evaluate(&self, word: &Word, submitted: &str) -> LearningResult {
        match self {
            LearningMode::Flashcards
            | LearningMode::MultipleChoice
            | LearningMode::FillInTheBlank => evaluate(word, submitted),
        }
    }
}
