//! Core types for the vocabulary trainer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A source-text/translation pair scoped to a language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub original: String,
    pub translation: String,
    pub language_id: i64,
}

/// A user-defined, language-scoped collection of words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub user_id: String,
    pub language_id: i64,
    #[serde(default)]
    pub words: Vec<Word>,
}

/// Persisted record of one answer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub user_id: String,
    pub word_id: i64,
    pub is_correct: bool,
    /// Set once a previously wrong answer is answered correctly in a repeat session.
    pub corrected: bool,
    pub timestamp: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Whether this entry still counts as an unresolved mistake.
    pub fn is_outstanding(&self) -> bool {
        !self.is_correct && !self.corrected
    }
}

/// Activity entry as published to observers, before it has been stored.
///
/// `corrected` is not represented: every entry starts uncorrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivityLogEntry {
    pub user_id: String,
    pub word_id: i64,
    pub is_correct: bool,
    pub timestamp: DateTime<Utc>,
}

impl NewActivityLogEntry {
    pub fn new(user_id: impl Into<String>, word_id: i64, is_correct: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            word_id,
            is_correct,
            timestamp,
        }
    }

    /// Attach a storage id, producing the persisted form.
    pub fn into_entry(self, id: i64) -> ActivityLogEntry {
        ActivityLogEntry {
            id,
            user_id: self.user_id,
            word_id: self.word_id,
            is_correct: self.is_correct,
            corrected: false,
            timestamp: self.timestamp,
        }
    }
}

/// Outcome of evaluating one answer. Never stored directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningResult {
    pub is_correct: bool,
    pub correct_answer: String,
    pub user_answer: String,
}

/// Learning modes. They govern presentation only; grading is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningMode {
    Flashcards,
    MultipleChoice,
    FillInTheBlank,
}

impl Default for LearningMode {
    fn default() -> Self {
        Self::Flashcards
    }
}

impl LearningMode {
    pub const ALL: [LearningMode; 3] = [
        LearningMode::Flashcards,
        LearningMode::MultipleChoice,
        LearningMode::FillInTheBlank,
    ];

    /// Get the mode name as stored and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flashcards => "flashcards",
            Self::MultipleChoice => "multiple_choice",
            Self::FillInTheBlank => "fill_in_the_blank",
        }
    }

    /// Parse a mode name, ignoring case and `_`/`-`/space separators.
    ///
    /// Accepts both `multiple_choice` and `MultipleChoice`.
    pub fn from_name(name: &str) -> Option<Self> {
        let folded: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "flashcards" | "flashcard" => Some(Self::Flashcards),
            "multiplechoice" => Some(Self::MultipleChoice),
            "fillintheblank" => Some(Self::FillInTheBlank),
            _ => None,
        }
    }

    /// Whether questions in this mode come with answer options.
    pub fn presents_options(&self) -> bool {
        matches!(self, Self::MultipleChoice)
    }
}

/// Which words a learning session draws from.
///
/// Serialized as `"all"`, `"repeatable"` or `{"group": 12}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionScope {
    Group(i64),
    All,
    Repeatable,
}

impl SessionScope {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Group(_) => "group",
            Self::All => "all",
            Self::Repeatable => "repeatable",
        }
    }

    pub fn group_id(&self) -> Option<i64> {
        match self {
            Self::Group(id) => Some(*id),
            _ => None,
        }
    }

    /// Rebuild a scope from its stored kind and optional group id.
    pub fn from_parts(kind: &str, group_id: Option<i64>) -> Option<Self> {
        match (kind, group_id) {
            ("group", Some(id)) => Some(Self::Group(id)),
            ("all", _) => Some(Self::All),
            ("repeatable", _) => Some(Self::Repeatable),
            _ => None,
        }
    }
}

/// State of an active learning session, held by the caller between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub language_id: i64,
    pub scope: SessionScope,
    pub mode: LearningMode,
    pub is_repeat: bool,
}

/// A word presented to the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub word_id: i64,
    pub original: String,
    pub mode: LearningMode,
    pub is_repeat: bool,
    /// Shuffled answer options, multiple-choice only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// A per-user, per-language set of words for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub id: i64,
    pub user_id: String,
    pub language_id: i64,
    pub words: Vec<Word>,
    pub created_on: NaiveDate,
    pub is_completed: bool,
}

/// Answer counts over a trailing window of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub days: u32,
    pub correct_count: usize,
    pub wrong_count: usize,
    pub corrected_count: usize,
    /// Wrong answers not yet corrected.
    pub outstanding_count: usize,
}

impl ActivityReport {
    /// Summarize entries already restricted to the report window.
    pub fn from_entries(days: u32, entries: &[ActivityLogEntry]) -> Self {
        let correct_count = entries.iter().filter(|e| e.is_correct).count();
        let corrected_count = entries
            .iter()
            .filter(|e| !e.is_correct && e.corrected)
            .count();

        Self {
            days,
            correct_count,
            wrong_count: entries.len() - correct_count,
            corrected_count,
            outstanding_count: entries.iter().filter(|e| e.is_outstanding()).count(),
        }
    }
}
