//! Caching decorator for word reads.
//!
//! Single words and per-language word lists are kept for at most
//! [`WORD_CACHE_TTL`] after loading, and dropped earlier when not read for
//! [`WORD_CACHE_IDLE`]. Every other repository call goes straight through.

use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::time::Instant;

use super::repository::{
    ActivityLogRepository, ChallengeRepository, GroupRepository, SessionRepository, WordRepository,
};
use crate::error::Result;
use crate::models::{
    ActivityLogEntry, DailyChallenge, Group, NewActivityLogEntry, SessionState, Word,
};

pub const WORD_CACHE_TTL: Duration = Duration::from_secs(10 * 60);
pub const WORD_CACHE_IDLE: Duration = Duration::from_secs(5 * 60);

struct Entry<V> {
    value: V,
    loaded_at: Instant,
    read_at: Instant,
}

/// Map whose entries expire on an absolute and a sliding deadline.
struct ExpiringMap<K, V> {
    entries: DashMap<K, Entry<V>>,
    ttl: Duration,
    idle: Duration,
}

impl<K, V> ExpiringMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn new(ttl: Duration, idle: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            idle,
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let hit = match self.entries.get_mut(key) {
            Some(mut entry) => {
                let fresh = now.duration_since(entry.loaded_at) < self.ttl
                    && now.duration_since(entry.read_at) < self.idle;
                if fresh {
                    entry.read_at = now;
                    Some(entry.value.clone())
                } else {
                    None
                }
            }
            None => return None,
        };

        // The shard guard is released before removing
        if hit.is_none() {
            self.entries.remove(key);
        }
        hit
    }

    fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        self.entries.insert(
            key,
            Entry {
                value,
                loaded_at: now,
                read_at: now,
            },
        );
    }

    fn remove(&self, key: &K) {
        self.entries.remove(key);
    }

    fn clear(&self) {
        self.entries.clear();
    }
}

/// Word repository decorator that serves repeated reads from memory.
///
/// Misses are not cached, so a word added after a failed lookup is found on
/// the next read.
pub struct CachedWordRepository<R> {
    inner: R,
    words: ExpiringMap<i64, Word>,
    languages: ExpiringMap<i64, Vec<Word>>,
}

impl<R> CachedWordRepository<R> {
    pub fn new(inner: R) -> Self {
        Self::with_expiry(inner, WORD_CACHE_TTL, WORD_CACHE_IDLE)
    }

    pub fn with_expiry(inner: R, ttl: Duration, idle: Duration) -> Self {
        Self {
            inner,
            words: ExpiringMap::new(ttl, idle),
            languages: ExpiringMap::new(ttl, idle),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Drop everything cached about a word after it was written.
    pub fn evict(&self, word: &Word) {
        self.words.remove(&word.id);
        self.languages.remove(&word.language_id);
    }

    pub fn clear(&self) {
        self.words.clear();
        self.languages.clear();
    }
}

// === Word Repository ===

impl<R: WordRepository> WordRepository for CachedWordRepository<R> {
    fn get_word(&self, word_id: i64) -> BoxFuture<'_, Result<Option<Word>>> {
        Box::pin(async move {
            if let Some(word) = self.words.get(&word_id) {
                tracing::trace!(word_id, "word cache hit");
                return Ok(Some(word));
            }

            let word = self.inner.get_word(word_id).await?;
            if let Some(word) = &word {
                self.words.insert(word_id, word.clone());
            }
            Ok(word)
        })
    }

    fn get_words_for_language(&self, language_id: i64) -> BoxFuture<'_, Result<Vec<Word>>> {
        Box::pin(async move {
            if let Some(words) = self.languages.get(&language_id) {
                tracing::trace!(language_id, "language word cache hit");
                return Ok(words);
            }

            let words = self.inner.get_words_for_language(language_id).await?;
            self.languages.insert(language_id, words.clone());
            Ok(words)
        })
    }

    fn get_words_by_ids<'a>(&'a self, word_ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Word>>> {
        self.inner.get_words_by_ids(word_ids)
    }

    fn get_random_words_excluding(
        &self,
        language_id: i64,
        exclude_id: i64,
        count: usize,
    ) -> BoxFuture<'_, Result<Vec<Word>>> {
        self.inner.get_random_words_excluding(language_id, exclude_id, count)
    }
}

// === Pass-through ===

impl<R: ActivityLogRepository> ActivityLogRepository for CachedWordRepository<R> {
    fn append_log<'a>(
        &'a self,
        entry: &'a NewActivityLogEntry,
    ) -> BoxFuture<'a, Result<ActivityLogEntry>> {
        self.inner.append_log(entry)
    }

    fn get_recent_logs<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
        days: i64,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<ActivityLogEntry>>> {
        self.inner.get_recent_logs(user_id, language_id, days, now)
    }

    fn mark_corrected<'a>(&'a self, user_id: &'a str, word_id: i64) -> BoxFuture<'a, Result<bool>> {
        self.inner.mark_corrected(user_id, word_id)
    }
}

impl<R: GroupRepository> GroupRepository for CachedWordRepository<R> {
    fn get_group_with_words(&self, group_id: i64) -> BoxFuture<'_, Result<Option<Group>>> {
        self.inner.get_group_with_words(group_id)
    }

    fn get_groups_for_language<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
    ) -> BoxFuture<'a, Result<Vec<Group>>> {
        self.inner.get_groups_for_language(user_id, language_id)
    }
}

impl<R: ChallengeRepository> ChallengeRepository for CachedWordRepository<R> {
    fn get_active_challenge<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
        day: NaiveDate,
    ) -> BoxFuture<'a, Result<Option<DailyChallenge>>> {
        self.inner.get_active_challenge(user_id, language_id, day)
    }

    fn insert_challenge<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
        day: NaiveDate,
        words: &'a [Word],
    ) -> BoxFuture<'a, Result<DailyChallenge>> {
        self.inner.insert_challenge(user_id, language_id, day, words)
    }

    fn get_challenge(&self, challenge_id: i64) -> BoxFuture<'_, Result<Option<DailyChallenge>>> {
        self.inner.get_challenge(challenge_id)
    }

    fn mark_challenge_completed(&self, challenge_id: i64) -> BoxFuture<'_, Result<bool>> {
        self.inner.mark_challenge_completed(challenge_id)
    }
}

impl<R: SessionRepository> SessionRepository for CachedWordRepository<R> {
    fn get_session<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<SessionState>>> {
        self.inner.get_session(user_id)
    }

    fn save_session<'a>(
        &'a self,
        user_id: &'a str,
        state: &'a SessionState,
    ) -> BoxFuture<'a, Result<()>> {
        self.inner.save_session(user_id, state)
    }

    fn clear_session<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<bool>> {
        self.inner.clear_session(user_id)
    }
}
