//! In-memory repository.
//!
//! Used by the test suites and when the server starts without a
//! `DATABASE_URL`. Contents are lost on restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::BoxFuture;
use learning_core::repetition::in_window;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::sync::RwLock;

use super::repository::{
    ActivityLogRepository, ChallengeRepository, GroupRepository, SessionRepository, WordRepository,
};
use crate::error::Result;
use crate::models::{
    ActivityLogEntry, DailyChallenge, Group, NewActivityLogEntry, SessionState, Word,
};

#[derive(Default)]
struct Tables {
    words: BTreeMap<i64, Word>,
    groups: BTreeMap<i64, Group>,
    logs: Vec<ActivityLogEntry>,
    challenges: BTreeMap<i64, DailyChallenge>,
    sessions: HashMap<String, SessionState>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct MemoryRepository {
    tables: RwLock<Tables>,
    rng: Mutex<StdRng>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Repository whose random word picks are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            rng: Mutex::new(rng),
        }
    }

    // === Seeding ===

    pub async fn insert_word(&self, original: &str, translation: &str, language_id: i64) -> Word {
        let mut tables = self.tables.write().await;
        let word = Word {
            id: tables.next_id(),
            original: original.to_string(),
            translation: translation.to_string(),
            language_id,
        };
        tables.words.insert(word.id, word.clone());
        word
    }

    /// Create a group holding the given words. Unknown word ids are skipped.
    pub async fn insert_group(
        &self,
        user_id: &str,
        name: &str,
        language_id: i64,
        word_ids: &[i64],
    ) -> Group {
        let mut tables = self.tables.write().await;
        let words = word_ids
            .iter()
            .filter_map(|id| tables.words.get(id).cloned())
            .collect();
        let group = Group {
            id: tables.next_id(),
            name: name.to_string(),
            user_id: user_id.to_string(),
            language_id,
            words,
        };
        tables.groups.insert(group.id, group.clone());
        group
    }

    /// Store a log entry as given, with a fresh id. Lets tests backdate entries.
    pub async fn insert_log(&self, mut entry: ActivityLogEntry) -> ActivityLogEntry {
        let mut tables = self.tables.write().await;
        entry.id = tables.next_id();
        tables.logs.push(entry.clone());
        entry
    }

    /// Snapshot of the whole activity log in insertion order.
    pub async fn logs(&self) -> Vec<ActivityLogEntry> {
        self.tables.read().await.logs.clone()
    }
}

// === Word Repository ===

impl WordRepository for MemoryRepository {
    fn get_word(&self, word_id: i64) -> BoxFuture<'_, Result<Option<Word>>> {
        Box::pin(async move { Ok(self.tables.read().await.words.get(&word_id).cloned()) })
    }

    fn get_words_for_language(&self, language_id: i64) -> BoxFuture<'_, Result<Vec<Word>>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables
                .words
                .values()
                .filter(|w| w.language_id == language_id)
                .cloned()
                .collect())
        })
    }

    fn get_words_by_ids<'a>(&'a self, word_ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Word>>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables
                .words
                .values()
                .filter(|w| word_ids.contains(&w.id))
                .cloned()
                .collect())
        })
    }

    fn get_random_words_excluding(
        &self,
        language_id: i64,
        exclude_id: i64,
        count: usize,
    ) -> BoxFuture<'_, Result<Vec<Word>>> {
        Box::pin(async move {
            let pool: Vec<Word> = {
                let tables = self.tables.read().await;
                tables
                    .words
                    .values()
                    .filter(|w| w.language_id == language_id && w.id != exclude_id)
                    .cloned()
                    .collect()
            };

            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            Ok(pool.choose_multiple(&mut *rng, count).cloned().collect())
        })
    }
}

// === Activity Log Repository ===

impl ActivityLogRepository for MemoryRepository {
    fn append_log<'a>(
        &'a self,
        entry: &'a NewActivityLogEntry,
    ) -> BoxFuture<'a, Result<ActivityLogEntry>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let stored = entry.clone().into_entry(tables.next_id());
            tables.logs.push(stored.clone());
            Ok(stored)
        })
    }

    fn get_recent_logs<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
        days: i64,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<ActivityLogEntry>>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            let mut logs: Vec<ActivityLogEntry> = tables
                .logs
                .iter()
                .filter(|e| e.user_id == user_id)
                .filter(|e| {
                    tables
                        .words
                        .get(&e.word_id)
                        .is_some_and(|w| w.language_id == language_id)
                })
                .filter(|e| in_window(e.timestamp, now, days))
                .cloned()
                .collect();
            logs.sort_by_key(|e| (e.timestamp, e.id));
            Ok(logs)
        })
    }

    fn mark_corrected<'a>(&'a self, user_id: &'a str, word_id: i64) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let oldest = tables
                .logs
                .iter_mut()
                .filter(|e| e.user_id == user_id && e.word_id == word_id && e.is_outstanding())
                .min_by_key(|e| (e.timestamp, e.id));

            match oldest {
                Some(entry) => {
                    entry.corrected = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }
}

// === Group Repository ===

impl GroupRepository for MemoryRepository {
    fn get_group_with_words(&self, group_id: i64) -> BoxFuture<'_, Result<Option<Group>>> {
        Box::pin(async move { Ok(self.tables.read().await.groups.get(&group_id).cloned()) })
    }

    fn get_groups_for_language<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
    ) -> BoxFuture<'a, Result<Vec<Group>>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            let mut groups: Vec<Group> = tables
                .groups
                .values()
                .filter(|g| g.user_id == user_id && g.language_id == language_id)
                .cloned()
                .collect();
            groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Ok(groups)
        })
    }
}

// === Challenge Repository ===

impl ChallengeRepository for MemoryRepository {
    fn get_active_challenge<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
        day: NaiveDate,
    ) -> BoxFuture<'a, Result<Option<DailyChallenge>>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables
                .challenges
                .values()
                .find(|c| c.user_id == user_id && c.language_id == language_id && c.created_on == day)
                .cloned())
        })
    }

    fn insert_challenge<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
        day: NaiveDate,
        words: &'a [Word],
    ) -> BoxFuture<'a, Result<DailyChallenge>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let existing = tables.challenges.values().find(|c| {
                c.user_id == user_id && c.language_id == language_id && c.created_on == day
            });
            if let Some(existing) = existing {
                return Ok(existing.clone());
            }

            let challenge = DailyChallenge {
                id: tables.next_id(),
                user_id: user_id.to_string(),
                language_id,
                words: words.to_vec(),
                created_on: day,
                is_completed: false,
            };
            tables.challenges.insert(challenge.id, challenge.clone());
            Ok(challenge)
        })
    }

    fn get_challenge(&self, challenge_id: i64) -> BoxFuture<'_, Result<Option<DailyChallenge>>> {
        Box::pin(async move { Ok(self.tables.read().await.challenges.get(&challenge_id).cloned()) })
    }

    fn mark_challenge_completed(&self, challenge_id: i64) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            match tables.challenges.get_mut(&challenge_id) {
                Some(challenge) => {
                    challenge.is_completed = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }
}

// === Session Repository ===

impl SessionRepository for MemoryRepository {
    fn get_session<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<SessionState>>> {
        Box::pin(async move { Ok(self.tables.read().await.sessions.get(user_id).copied()) })
    }

    fn save_session<'a>(
        &'a self,
        user_id: &'a str,
        state: &'a SessionState,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.tables
                .write()
                .await
                .sessions
                .insert(user_id.to_string(), *state);
            Ok(())
        })
    }

    fn clear_session<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move { Ok(self.tables.write().await.sessions.remove(user_id).is_some()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
    }

    fn failure(word_id: i64, at: DateTime<Utc>) -> ActivityLogEntry {
        ActivityLogEntry {
            id: 0,
            user_id: "u1".to_string(),
            word_id,
            is_correct: false,
            corrected: false,
            timestamp: at,
        }
    }

    #[tokio::test]
    async fn test_append_assigns_ids_and_starts_uncorrected() {
        let repo = MemoryRepository::with_seed(1);
        let word = repo.insert_word("perro", "dog", 1).await;

        let first = repo
            .append_log(&NewActivityLogEntry::new("u1", word.id, false, now()))
            .await
            .unwrap();
        let second = repo
            .append_log(&NewActivityLogEntry::new("u1", word.id, true, now()))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert!(!first.corrected);
        assert_eq!(repo.logs().await.len(), 2);
    }

    #[tokio::test]
    async fn test_recent_logs_are_scoped_to_user_language_and_window() {
        let repo = MemoryRepository::with_seed(1);
        let spanish = repo.insert_word("perro", "dog", 1).await;
        let french = repo.insert_word("chien", "dog", 2).await;

        repo.insert_log(failure(spanish.id, now() - Duration::days(2))).await;
        repo.insert_log(failure(spanish.id, now() - Duration::days(9))).await;
        repo.insert_log(failure(french.id, now() - Duration::days(1))).await;
        repo.insert_log(ActivityLogEntry {
            user_id: "u2".to_string(),
            ..failure(spanish.id, now())
        })
        .await;

        let logs = repo.get_recent_logs("u1", 1, 7, now()).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].word_id, spanish.id);
    }

    #[tokio::test]
    async fn test_mark_corrected_flags_oldest_failure_only() {
        let repo = MemoryRepository::with_seed(1);
        let word = repo.insert_word("perro", "dog", 1).await;
        let older = repo.insert_log(failure(word.id, now() - Duration::days(3))).await;
        let newer = repo.insert_log(failure(word.id, now() - Duration::days(1))).await;

        assert!(repo.mark_corrected("u1", word.id).await.unwrap());

        let logs = repo.logs().await;
        let find = |id: i64| logs.iter().find(|e| e.id == id).unwrap().corrected;
        assert!(find(older.id));
        assert!(!find(newer.id));
    }

    #[tokio::test]
    async fn test_mark_corrected_never_touches_correct_answers() {
        let repo = MemoryRepository::with_seed(1);
        let word = repo.insert_word("perro", "dog", 1).await;
        repo.append_log(&NewActivityLogEntry::new("u1", word.id, true, now()))
            .await
            .unwrap();

        assert!(!repo.mark_corrected("u1", word.id).await.unwrap());
        assert!(repo.logs().await.iter().all(|e| !e.corrected));
    }

    #[tokio::test]
    async fn test_random_words_exclude_given_word() {
        let repo = MemoryRepository::with_seed(3);
        let keep = repo.insert_word("uno", "one", 1).await;
        for (o, t) in [("dos", "two"), ("tres", "three"), ("cuatro", "four")] {
            repo.insert_word(o, t, 1).await;
        }
        repo.insert_word("un", "one", 2).await;

        let picked = repo.get_random_words_excluding(1, keep.id, 10).await.unwrap();
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|w| w.id != keep.id && w.language_id == 1));
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let repo = MemoryRepository::new();
        let state = SessionState {
            language_id: 1,
            scope: crate::models::SessionScope::All,
            mode: crate::models::LearningMode::FillInTheBlank,
            is_repeat: false,
        };

        repo.save_session("u1", &state).await.unwrap();
        assert_eq!(repo.get_session("u1").await.unwrap(), Some(state));
        assert!(repo.clear_session("u1").await.unwrap());
        assert!(!repo.clear_session("u1").await.unwrap());
        assert_eq!(repo.get_session("u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_second_insert_for_same_day_returns_first_challenge() {
        let repo = MemoryRepository::with_seed(1);
        let a = repo.insert_word("perro", "dog", 1).await;
        let b = repo.insert_word("gato", "cat", 1).await;
        let day = now().date_naive();

        let first = repo
            .insert_challenge("u1", 1, day, std::slice::from_ref(&a))
            .await
            .unwrap();
        let second = repo
            .insert_challenge("u1", 1, day, std::slice::from_ref(&b))
            .await
            .unwrap();
        let other_user = repo
            .insert_challenge("u2", 1, day, std::slice::from_ref(&b))
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.words, vec![a]);
        assert_ne!(other_user.id, first.id);
    }
}
