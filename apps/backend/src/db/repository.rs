//! Repository pattern for data access.
//!
//! Methods return boxed futures so the traits stay object safe and the
//! application state can hold `Arc<dyn LearningRepository>`.

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::BoxFuture;

use crate::error::Result;
use crate::models::{
    ActivityLogEntry, DailyChallenge, Group, NewActivityLogEntry, SessionState, Word,
};

/// Read access to words.
pub trait WordRepository: Send + Sync {
    fn get_word(&self, word_id: i64) -> BoxFuture<'_, Result<Option<Word>>>;

    fn get_words_for_language(&self, language_id: i64) -> BoxFuture<'_, Result<Vec<Word>>>;

    /// Words with the given ids, ordered by id. Unknown ids are skipped.
    fn get_words_by_ids<'a>(&'a self, word_ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Word>>>;

    /// Up to `count` random words of a language, never including `exclude_id`.
    fn get_random_words_excluding(
        &self,
        language_id: i64,
        exclude_id: i64,
        count: usize,
    ) -> BoxFuture<'_, Result<Vec<Word>>>;
}

/// Append-only activity log.
pub trait ActivityLogRepository: Send + Sync {
    fn append_log<'a>(
        &'a self,
        entry: &'a NewActivityLogEntry,
    ) -> BoxFuture<'a, Result<ActivityLogEntry>>;

    /// Entries of a user in `[now - days, now]` whose word belongs to the language.
    fn get_recent_logs<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
        days: i64,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<ActivityLogEntry>>>;

    /// Flag the oldest uncorrected wrong answer of (user, word) as corrected.
    ///
    /// Returns false when there was nothing to correct.
    fn mark_corrected<'a>(&'a self, user_id: &'a str, word_id: i64) -> BoxFuture<'a, Result<bool>>;
}

/// Groups with their member words.
pub trait GroupRepository: Send + Sync {
    fn get_group_with_words(&self, group_id: i64) -> BoxFuture<'_, Result<Option<Group>>>;

    fn get_groups_for_language<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
    ) -> BoxFuture<'a, Result<Vec<Group>>>;
}

/// Daily challenges.
pub trait ChallengeRepository: Send + Sync {
    fn get_active_challenge<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
        day: NaiveDate,
    ) -> BoxFuture<'a, Result<Option<DailyChallenge>>>;

    /// Store a new challenge for the day. When one already exists for
    /// (user, language, day), that challenge is returned unchanged.
    fn insert_challenge<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
        day: NaiveDate,
        words: &'a [Word],
    ) -> BoxFuture<'a, Result<DailyChallenge>>;

    fn get_challenge(&self, challenge_id: i64) -> BoxFuture<'_, Result<Option<DailyChallenge>>>;

    fn mark_challenge_completed(&self, challenge_id: i64) -> BoxFuture<'_, Result<bool>>;
}

/// Per-user learning session state.
pub trait SessionRepository: Send + Sync {
    fn get_session<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<SessionState>>>;

    fn save_session<'a>(
        &'a self,
        user_id: &'a str,
        state: &'a SessionState,
    ) -> BoxFuture<'a, Result<()>>;

    /// Returns whether a session existed.
    fn clear_session<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<bool>>;
}

/// Everything the learning services need from storage.
pub trait LearningRepository:
    WordRepository + ActivityLogRepository + GroupRepository + ChallengeRepository + SessionRepository
{
}

impl<T> LearningRepository for T where
    T: WordRepository
        + ActivityLogRepository
        + GroupRepository
        + ChallengeRepository
        + SessionRepository
{
}
