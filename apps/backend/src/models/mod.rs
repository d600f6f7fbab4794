//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Re-export shared types from learning-core
pub use learning_core::types::{
    ActivityLogEntry, ActivityReport, DailyChallenge, Group, LearningMode, LearningResult,
    NewActivityLogEntry, Question, SessionScope, SessionState, Word,
};

// === Database Entity Types ===

/// Word stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWord {
    pub id: i64,
    pub original: String,
    pub translation: String,
    pub language_id: i64,
}

impl DbWord {
    /// Convert to core word type
    pub fn to_word(&self) -> Word {
        Word {
            id: self.id,
            original: self.original.clone(),
            translation: self.translation.clone(),
            language_id: self.language_id,
        }
    }
}

/// Group row (members are loaded separately)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbGroup {
    pub id: i64,
    pub name: String,
    pub user_id: String,
    pub language_id: i64,
}

impl DbGroup {
    pub fn to_group(&self, words: Vec<Word>) -> Group {
        Group {
            id: self.id,
            name: self.name.clone(),
            user_id: self.user_id.clone(),
            language_id: self.language_id,
            words,
        }
    }
}

/// Activity log row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbActivityLog {
    pub id: i64,
    pub user_id: String,
    pub word_id: i64,
    pub is_correct: bool,
    pub corrected: bool,
    pub logged_at: DateTime<Utc>,
}

impl DbActivityLog {
    pub fn to_entry(&self) -> ActivityLogEntry {
        ActivityLogEntry {
            id: self.id,
            user_id: self.user_id.clone(),
            word_id: self.word_id,
            is_correct: self.is_correct,
            corrected: self.corrected,
            timestamp: self.logged_at,
        }
    }
}

/// Daily challenge row (words are loaded separately)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDailyChallenge {
    pub id: i64,
    pub user_id: String,
    pub language_id: i64,
    pub created_on: NaiveDate,
    pub is_completed: bool,
}

impl DbDailyChallenge {
    pub fn to_challenge(&self, words: Vec<Word>) -> DailyChallenge {
        DailyChallenge {
            id: self.id,
            user_id: self.user_id.clone(),
            language_id: self.language_id,
            words,
            created_on: self.created_on,
            is_completed: self.is_completed,
        }
    }
}

/// Active learning session, one per user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbLearningSession {
    pub user_id: String,
    pub language_id: i64,
    pub scope_kind: String,
    pub group_id: Option<i64>,
    pub mode: String,
    pub is_repeat: bool,
    pub updated_at: DateTime<Utc>,
}

impl DbLearningSession {
    /// Create from core session state
    pub fn from_state(user_id: &str, state: &SessionState) -> Self {
        Self {
            user_id: user_id.to_string(),
            language_id: state.language_id,
            scope_kind: state.scope.kind().to_string(),
            group_id: state.scope.group_id(),
            mode: state.mode.as_str().to_string(),
            is_repeat: state.is_repeat,
            updated_at: Utc::now(),
        }
    }

    /// Convert to core session state. Rows with an unreadable scope or mode count as no session.
    pub fn to_state(&self) -> Option<SessionState> {
        Some(SessionState {
            language_id: self.language_id,
            scope: SessionScope::from_parts(&self.scope_kind, self.group_id)?,
            mode: LearningMode::from_name(&self.mode)?,
            is_repeat: self.is_repeat,
        })
    }
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageQuery {
    pub language_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: i64,
    pub name: String,
    pub language_id: i64,
    pub word_count: usize,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            language_id: group.language_id,
            word_count: group.words.len(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupListResponse {
    pub groups: Vec<GroupSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WordListResponse {
    pub words: Vec<Word>,
}

// Learning types
#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub language_id: i64,
    pub scope: Option<SessionScope>,
    pub mode: Option<String>,
    #[serde(default)]
    pub is_repeat: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndSessionResponse {
    pub ended: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub word_id: i64,
    pub answer: String,
}

// Report types
#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityReportQuery {
    pub language_id: i64,
    pub days: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stored(scope_kind: &str, group_id: Option<i64>, mode: &str) -> DbLearningSession {
        DbLearningSession {
            user_id: "u1".to_string(),
            language_id: 1,
            scope_kind: scope_kind.to_string(),
            group_id,
            mode: mode.to_string(),
            is_repeat: false,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stored_session_converts_back() {
        let state = stored("group", Some(4), "multiple_choice").to_state().unwrap();

        assert_eq!(state.scope, SessionScope::Group(4));
        assert_eq!(state.mode, LearningMode::MultipleChoice);
    }

    #[test]
    fn test_unreadable_mode_is_no_session() {
        assert!(stored("all", None, "crossword").to_state().is_none());
    }

    #[test]
    fn test_unreadable_scope_is_no_session() {
        assert!(stored("group", None, "flashcards").to_state().is_none());
    }
}
