//! Core vocabulary-learning library used by the backend.
//!
//! Provides:
//! - Shared types (Word, ActivityLogEntry, SessionState, etc.)
//! - Answer evaluation for the three learning modes
//! - Repeat-window filtering of the activity log
//! - Session start validation
//! - Random word selection and multiple-choice options with an injected RNG

pub mod error;
pub mod evaluation;
pub mod repetition;
pub mod selection;
pub mod session;
pub mod types;

pub use error::{LearningError, Result};
pub use evaluation::{answers_match, evaluate};
pub use repetition::{repeatable_word_ids, REPEAT_WINDOW_DAYS};
pub use selection::{build_options, pick_challenge_words, pick_word, DAILY_CHALLENGE_SIZE, DISTRACTOR_COUNT};
pub use session::start_session;
pub use types::{
    ActivityLogEntry, ActivityReport, DailyChallenge, Group, LearningMode, LearningResult,
    NewActivityLogEntry, Question, SessionScope, SessionState, Word,
};
