//! Words due for repetition.

use chrono::{DateTime, Utc};
use learning_core::{repeatable_word_ids, REPEAT_WINDOW_DAYS};

use crate::db::{ActivityLogRepository, WordRepository};
use crate::error::Result;
use crate::models::Word;

/// Words of a language the user answered wrongly in the last week and has not
/// corrected since, each listed once. Read-only.
pub async fn words_to_repeat<R>(
    repo: &R,
    user_id: &str,
    language_id: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Word>>
where
    R: WordRepository + ActivityLogRepository + ?Sized,
{
    let logs = repo
        .get_recent_logs(user_id, language_id, REPEAT_WINDOW_DAYS, now)
        .await?;

    let ids: Vec<i64> = repeatable_word_ids(&logs, now).into_iter().collect();
    repo.get_words_by_ids(&ids).await
}
