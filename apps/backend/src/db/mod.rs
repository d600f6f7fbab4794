//! PostgreSQL database operations

pub mod cache;
pub mod memory;
pub mod repository;

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::BoxFuture;
use learning_core::repetition::window_start;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::{ApiError, Result};
use crate::models::*;

pub use cache::CachedWordRepository;
pub use memory::MemoryRepository;
pub use repository::{
    ActivityLogRepository, ChallengeRepository, GroupRepository, LearningRepository,
    SessionRepository, WordRepository,
};

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === Seeding ===

    pub async fn insert_language(&self, name: &str) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO languages (name)
            VALUES ($1)
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn insert_word(&self, original: &str, translation: &str, language_id: i64) -> Result<Word> {
        let word = sqlx::query_as::<_, DbWord>(
            r#"
            INSERT INTO words (original, translation, language_id)
            VALUES ($1, $2, $3)
            RETURNING id, original, translation, language_id
            "#,
        )
        .bind(original)
        .bind(translation)
        .bind(language_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(word.to_word())
    }

    pub async fn insert_group(&self, user_id: &str, name: &str, language_id: i64) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO groups (name, user_id, language_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(user_id)
        .bind(language_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn add_word_to_group(&self, group_id: i64, word_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO group_words (group_id, word_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(word_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a log entry with an explicit timestamp and corrected flag
    pub async fn insert_log(&self, entry: &ActivityLogEntry) -> Result<ActivityLogEntry> {
        let log = sqlx::query_as::<_, DbActivityLog>(
            r#"
            INSERT INTO activity_logs (user_id, word_id, is_correct, corrected, logged_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, word_id, is_correct, corrected, logged_at
            "#,
        )
        .bind(&entry.user_id)
        .bind(entry.word_id)
        .bind(entry.is_correct)
        .bind(entry.corrected)
        .bind(entry.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(log.to_entry())
    }

    async fn load_group_words(&self, group_id: i64) -> Result<Vec<Word>> {
        let words = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT w.id, w.original, w.translation, w.language_id
            FROM words w
            JOIN group_words gw ON gw.word_id = w.id
            WHERE gw.group_id = $1
            ORDER BY w.id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(words.iter().map(DbWord::to_word).collect())
    }

    async fn load_challenge_words(&self, challenge_id: i64) -> Result<Vec<Word>> {
        let words = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT w.id, w.original, w.translation, w.language_id
            FROM words w
            JOIN daily_challenge_words cw ON cw.word_id = w.id
            WHERE cw.challenge_id = $1
            ORDER BY cw.position
            "#,
        )
        .bind(challenge_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(words.iter().map(DbWord::to_word).collect())
    }
}

// === Word Repository ===

impl WordRepository for Database {
    fn get_word(&self, word_id: i64) -> BoxFuture<'_, Result<Option<Word>>> {
        Box::pin(async move {
            let word = sqlx::query_as::<_, DbWord>(
                r#"
                SELECT id, original, translation, language_id
                FROM words
                WHERE id = $1
                "#,
            )
            .bind(word_id)
            .fetch_optional(&self.pool)
            .await?;

            Ok(word.map(|w| w.to_word()))
        })
    }

    fn get_words_for_language(&self, language_id: i64) -> BoxFuture<'_, Result<Vec<Word>>> {
        Box::pin(async move {
            let words = sqlx::query_as::<_, DbWord>(
                r#"
                SELECT id, original, translation, language_id
                FROM words
                WHERE language_id = $1
                ORDER BY id
                "#,
            )
            .bind(language_id)
            .fetch_all(&self.pool)
            .await?;

            Ok(words.iter().map(DbWord::to_word).collect())
        })
    }

    fn get_words_by_ids<'a>(&'a self, word_ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Word>>> {
        Box::pin(async move {
            if word_ids.is_empty() {
                return Ok(Vec::new());
            }

            let words = sqlx::query_as::<_, DbWord>(
                r#"
                SELECT id, original, translation, language_id
                FROM words
                WHERE id = ANY($1)
                ORDER BY id
                "#,
            )
            .bind(word_ids)
            .fetch_all(&self.pool)
            .await?;

            Ok(words.iter().map(DbWord::to_word).collect())
        })
    }

    fn get_random_words_excluding(
        &self,
        language_id: i64,
        exclude_id: i64,
        count: usize,
    ) -> BoxFuture<'_, Result<Vec<Word>>> {
        Box::pin(async move {
            let words = sqlx::query_as::<_, DbWord>(
                r#"
                SELECT id, original, translation, language_id
                FROM words
                WHERE language_id = $1 AND id <> $2
                ORDER BY random()
                LIMIT $3
                "#,
            )
            .bind(language_id)
            .bind(exclude_id)
            .bind(count as i64)
            .fetch_all(&self.pool)
            .await?;

            Ok(words.iter().map(DbWord::to_word).collect())
        })
    }
}

// === Activity Log Repository ===

impl ActivityLogRepository for Database {
    fn append_log<'a>(
        &'a self,
        entry: &'a NewActivityLogEntry,
    ) -> BoxFuture<'a, Result<ActivityLogEntry>> {
        Box::pin(async move {
            let log = sqlx::query_as::<_, DbActivityLog>(
                r#"
                INSERT INTO activity_logs (user_id, word_id, is_correct, logged_at)
                VALUES ($1, $2, $3, $4)
                RETURNING id, user_id, word_id, is_correct, corrected, logged_at
                "#,
            )
            .bind(&entry.user_id)
            .bind(entry.word_id)
            .bind(entry.is_correct)
            .bind(entry.timestamp)
            .fetch_one(&self.pool)
            .await?;

            Ok(log.to_entry())
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
            let logs = sqlx::query_as::<_, DbActivityLog>(
                r#"
                SELECT a.id, a.user_id, a.word_id, a.is_correct, a.corrected, a.logged_at
                FROM activity_logs a
                JOIN words w ON w.id = a.word_id
                WHERE a.user_id = $1
                  AND w.language_id = $2
                  AND a.logged_at >= $3
                  AND a.logged_at <= $4
                ORDER BY a.logged_at, a.id
                "#,
            )
            .bind(user_id)
            .bind(language_id)
            .bind(window_start(now, days))
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

            Ok(logs.iter().map(DbActivityLog::to_entry).collect())
        })
    }

    fn mark_corrected<'a>(&'a self, user_id: &'a str, word_id: i64) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let result = sqlx::query(
                r#"
                UPDATE activity_logs
                SET corrected = TRUE
                WHERE id = (
                    SELECT id FROM activity_logs
                    WHERE user_id = $1 AND word_id = $2
                      AND is_correct = FALSE AND corrected = FALSE
                    ORDER BY logged_at, id
                    LIMIT 1
                )
                "#,
            )
            .bind(user_id)
            .bind(word_id)
            .execute(&self.pool)
            .await?;

            Ok(result.rows_affected() > 0)
        })
    }
}

// === Group Repository ===

impl GroupRepository for Database {
    fn get_group_with_words(&self, group_id: i64) -> BoxFuture<'_, Result<Option<Group>>> {
        Box::pin(async move {
            let group = sqlx::query_as::<_, DbGroup>(
                r#"
                SELECT id, name, user_id, language_id
                FROM groups
                WHERE id = $1
                "#,
            )
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?;

            match group {
                Some(group) => {
                    let words = self.load_group_words(group.id).await?;
                    Ok(Some(group.to_group(words)))
                }
                None => Ok(None),
            }
        })
    }

    fn get_groups_for_language<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
    ) -> BoxFuture<'a, Result<Vec<Group>>> {
        Box::pin(async move {
            let rows = sqlx::query_as::<_, DbGroup>(
                r#"
                SELECT id, name, user_id, language_id
                FROM groups
                WHERE user_id = $1 AND language_id = $2
                ORDER BY name, id
                "#,
            )
            .bind(user_id)
            .bind(language_id)
            .fetch_all(&self.pool)
            .await?;

            let mut groups = Vec::with_capacity(rows.len());
            for row in rows {
                let words = self.load_group_words(row.id).await?;
                groups.push(row.to_group(words));
            }

            Ok(groups)
        })
    }
}

// === Challenge Repository ===

impl ChallengeRepository for Database {
    fn get_active_challenge<'a>(
        &'a self,
        user_id: &'a str,
        language_id: i64,
        day: NaiveDate,
    ) -> BoxFuture<'a, Result<Option<DailyChallenge>>> {
        Box::pin(async move {
            let challenge = sqlx::query_as::<_, DbDailyChallenge>(
                r#"
                SELECT id, user_id, language_id, created_on, is_completed
                FROM daily_challenges
                WHERE user_id = $1 AND language_id = $2 AND created_on = $3
                "#,
            )
            .bind(user_id)
            .bind(language_id)
            .bind(day)
            .fetch_optional(&self.pool)
            .await?;

            match challenge {
                Some(challenge) => {
                    let words = self.load_challenge_words(challenge.id).await?;
                    Ok(Some(challenge.to_challenge(words)))
                }
                None => Ok(None),
            }
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
            let mut tx = self.pool.begin().await?;

            let inserted = sqlx::query_as::<_, DbDailyChallenge>(
                r#"
                INSERT INTO daily_challenges (user_id, language_id, created_on)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, language_id, created_on) DO NOTHING
                RETURNING id, user_id, language_id, created_on, is_completed
                "#,
            )
            .bind(user_id)
            .bind(language_id)
            .bind(day)
            .fetch_optional(&mut *tx)
            .await?;

            // Lost the race to a concurrent first request for the same day
            let Some(challenge) = inserted else {
                tx.rollback().await?;
                tracing::debug!(user_id, language_id, %day, "daily challenge already created");
                return self
                    .get_active_challenge(user_id, language_id, day)
                    .await?
                    .ok_or_else(|| {
                        ApiError::Internal("daily challenge vanished after conflict".to_string())
                    });
            };

            for (position, word) in words.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO daily_challenge_words (challenge_id, word_id, position)
                    VALUES ($1, $2, $3)
                    "#,
                )
                .bind(challenge.id)
                .bind(word.id)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;

            Ok(challenge.to_challenge(words.to_vec()))
        })
    }

    fn get_challenge(&self, challenge_id: i64) -> BoxFuture<'_, Result<Option<DailyChallenge>>> {
        Box::pin(async move {
            let challenge = sqlx::query_as::<_, DbDailyChallenge>(
                r#"
                SELECT id, user_id, language_id, created_on, is_completed
                FROM daily_challenges
                WHERE id = $1
                "#,
            )
            .bind(challenge_id)
            .fetch_optional(&self.pool)
            .await?;

            match challenge {
                Some(challenge) => {
                    let words = self.load_challenge_words(challenge.id).await?;
                    Ok(Some(challenge.to_challenge(words)))
                }
                None => Ok(None),
            }
        })
    }

    fn mark_challenge_completed(&self, challenge_id: i64) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let result = sqlx::query(
                r#"
                UPDATE daily_challenges
                SET is_completed = TRUE
                WHERE id = $1
                "#,
            )
            .bind(challenge_id)
            .execute(&self.pool)
            .await?;

            Ok(result.rows_affected() > 0)
        })
    }
}

// === Session Repository ===

impl SessionRepository for Database {
    fn get_session<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<SessionState>>> {
        Box::pin(async move {
            let session = sqlx::query_as::<_, DbLearningSession>(
                r#"
                SELECT user_id, language_id, scope_kind, group_id, mode, is_repeat, updated_at
                FROM learning_sessions
                WHERE user_id = $1
                "#,
            )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

            Ok(session.and_then(|s| s.to_state()))
        })
    }

    fn save_session<'a>(
        &'a self,
        user_id: &'a str,
        state: &'a SessionState,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let row = DbLearningSession::from_state(user_id, state);

            sqlx::query(
                r#"
                INSERT INTO learning_sessions
                    (user_id, language_id, scope_kind, group_id, mode, is_repeat, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (user_id) DO UPDATE SET
                    language_id = EXCLUDED.language_id,
                    scope_kind = EXCLUDED.scope_kind,
                    group_id = EXCLUDED.group_id,
                    mode = EXCLUDED.mode,
                    is_repeat = EXCLUDED.is_repeat,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(&row.user_id)
            .bind(row.language_id)
            .bind(&row.scope_kind)
            .bind(row.group_id)
            .bind(&row.mode)
            .bind(row.is_repeat)
            .bind(row.updated_at)
            .execute(&self.pool)
            .await?;

            Ok(())
        })
    }

    fn clear_session<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM learning_sessions WHERE user_id = $1")
                .bind(user_id)
                .execute(&self.pool)
                .await?;

            Ok(result.rows_affected() > 0)
        })
    }
}
