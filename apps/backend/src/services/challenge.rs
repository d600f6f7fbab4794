//! Daily challenges.

use chrono::NaiveDate;
use learning_core::pick_challenge_words;
use rand::Rng;

use crate::db::{ChallengeRepository, WordRepository};
use crate::error::{ApiError, Result};
use crate::models::DailyChallenge;

/// Today's challenge for (user, language), created on first request.
///
/// Returns `None` when the language has no words.
pub async fn get_or_create<R, G>(
    repo: &R,
    user_id: &str,
    language_id: i64,
    today: NaiveDate,
    rng: &mut G,
) -> Result<Option<DailyChallenge>>
where
    R: ChallengeRepository + WordRepository + ?Sized,
    G: Rng + Send + ?Sized,
{
    if let Some(existing) = repo.get_active_challenge(user_id, language_id, today).await? {
        return Ok(Some(existing));
    }

    let words = repo.get_words_for_language(language_id).await?;
    if words.is_empty() {
        return Ok(None);
    }

    let picked = pick_challenge_words(&words, rng);
    let challenge = repo
        .insert_challenge(user_id, language_id, today, &picked)
        .await?;

    tracing::info!(
        user_id,
        language_id,
        challenge_id = challenge.id,
        words = challenge.words.len(),
        "daily challenge created"
    );

    Ok(Some(challenge))
}

/// Mark a challenge as completed. Challenges of other users are not found.
pub async fn complete<R>(repo: &R, user_id: &str, challenge_id: i64) -> Result<DailyChallenge>
where
    R: ChallengeRepository + ?Sized,
{
    let mut challenge = repo
        .get_challenge(challenge_id)
        .await?
        .filter(|c| c.user_id == user_id)
        .ok_or_else(|| ApiError::NotFound(format!("Challenge {} not found", challenge_id)))?;

    if !challenge.is_completed {
        repo.mark_challenge_completed(challenge_id).await?;
        challenge.is_completed = true;
    }

    Ok(challenge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    async fn repo_with_words(n: usize) -> MemoryRepository {
        let repo = MemoryRepository::with_seed(1);
        for i in 0..n {
            repo.insert_word(&format!("słowo {}", i), &format!("word {}", i), 1)
                .await;
        }
        repo
    }

    #[tokio::test]
    async fn test_challenge_is_stable_within_a_day() {
        let repo = repo_with_words(25).await;
        let mut rng = StdRng::seed_from_u64(1);

        let first = get_or_create(&repo, "u1", 1, day(20), &mut rng)
            .await
            .unwrap()
            .unwrap();
        let again = get_or_create(&repo, "u1", 1, day(20), &mut rng)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(first.words, again.words);
        assert_eq!(first.words.len(), 10);
        let ids: HashSet<_> = first.words.iter().map(|w| w.id).collect();
        assert_eq!(ids.len(), 10);
        assert!(!first.is_completed);
    }

    #[tokio::test]
    async fn test_new_day_gets_new_challenge() {
        let repo = repo_with_words(3).await;
        let mut rng = StdRng::seed_from_u64(2);

        let monday = get_or_create(&repo, "u1", 1, day(20), &mut rng).await.unwrap().unwrap();
        let tuesday = get_or_create(&repo, "u1", 1, day(21), &mut rng).await.unwrap().unwrap();

        assert_ne!(monday.id, tuesday.id);
        assert_eq!(tuesday.words.len(), 3);
    }

    #[tokio::test]
    async fn test_no_words_means_no_challenge() {
        let repo = repo_with_words(0).await;
        let mut rng = StdRng::seed_from_u64(3);

        let challenge = get_or_create(&repo, "u1", 1, day(20), &mut rng).await.unwrap();
        assert!(challenge.is_none());
    }

    #[tokio::test]
    async fn test_complete_marks_challenge() {
        let repo = repo_with_words(5).await;
        let mut rng = StdRng::seed_from_u64(4);
        let challenge = get_or_create(&repo, "u1", 1, day(20), &mut rng).await.unwrap().unwrap();

        let done = complete(&repo, "u1", challenge.id).await.unwrap();
        assert!(done.is_completed);

        let reloaded = get_or_create(&repo, "u1", 1, day(20), &mut rng).await.unwrap().unwrap();
        assert!(reloaded.is_completed);
    }

    #[tokio::test]
    async fn test_complete_unknown_or_foreign_is_not_found() {
        let repo = repo_with_words(5).await;
        let mut rng = StdRng::seed_from_u64(5);
        let challenge = get_or_create(&repo, "u1", 1, day(20), &mut rng).await.unwrap().unwrap();

        let err = complete(&repo, "u2", challenge.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let err = complete(&repo, "u1", 9999).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
