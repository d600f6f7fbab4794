//! Answer evaluation with activity publication.

use chrono::{DateTime, Utc};
use learning_core::LearningError;

use crate::db::WordRepository;
use crate::error::Result;
use crate::models::{LearningMode, LearningResult, NewActivityLogEntry};
use crate::services::notifier::ActivityNotifier;

/// Evaluator for one learning mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerEvaluator {
    mode: LearningMode,
}

impl AnswerEvaluator {
    pub fn for_mode(mode: LearningMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> LearningMode {
        self.mode
    }

    /// Judge `answer` against the word's translation and publish the outcome.
    ///
    /// The result is returned only after every observer accepted the entry.
    pub async fn evaluate<R>(
        &self,
        words: &R,
        notifier: &ActivityNotifier,
        user_id: &str,
        word_id: i64,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<LearningResult>
    where
        R: WordRepository + ?Sized,
    {
        let word = words
            .get_word(word_id)
            .await?
            .ok_or(LearningError::WordNotFound(word_id))?;

        let result = self.mode.evaluate(&word, answer);

        let entry = NewActivityLogEntry::new(user_id, word.id, result.is_correct, now);
        notifier.notify(&entry).await?;

        tracing::debug!(
            user_id,
            word_id,
            mode = self.mode.as_str(),
            is_correct = result.is_correct,
            "answer evaluated"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;
    use crate::error::ApiError;
    use crate::services::notifier::ActivityLogger;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    async fn setup() -> (Arc<MemoryRepository>, ActivityNotifier, i64) {
        let repo = Arc::new(MemoryRepository::with_seed(1));
        let word = repo.insert_word("pies", "dog", 1).await;
        let mut notifier = ActivityNotifier::new();
        notifier.attach(Arc::new(ActivityLogger::new(repo.clone())));
        (repo, notifier, word.id)
    }

    #[tokio::test]
    async fn test_answer_in_any_case_is_correct() {
        let (repo, notifier, word_id) = setup().await;

        for answer in ["dog", "DOG", "Dog"] {
            for mode in LearningMode::ALL {
                let result = AnswerEvaluator::for_mode(mode)
                    .evaluate(repo.as_ref(), &notifier, "u1", word_id, answer, Utc::now())
                    .await
                    .unwrap();
                assert!(result.is_correct, "{} in {:?}", answer, mode);
            }
        }
    }

    #[tokio::test]
    async fn test_wrong_answer_reports_translation() {
        let (repo, notifier, word_id) = setup().await;

        let result = AnswerEvaluator::for_mode(LearningMode::FillInTheBlank)
            .evaluate(repo.as_ref(), &notifier, "u1", word_id, "dogx", Utc::now())
            .await
            .unwrap();

        assert_eq!(
            result,
            LearningResult {
                is_correct: false,
                correct_answer: "dog".to_string(),
                user_answer: "dogx".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_each_evaluation_appends_exactly_one_entry() {
        let (repo, notifier, word_id) = setup().await;
        let evaluator = AnswerEvaluator::for_mode(LearningMode::Flashcards);
        let now = Utc::now();

        evaluator
            .evaluate(repo.as_ref(), &notifier, "u1", word_id, "cat", now)
            .await
            .unwrap();

        let logs = repo.logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].user_id, "u1");
        assert_eq!(logs[0].word_id, word_id);
        assert_eq!(logs[0].timestamp, now);
        assert!(!logs[0].is_correct);
        assert!(!logs[0].corrected);
    }

    #[tokio::test]
    async fn test_missing_word_is_not_found_and_logs_nothing() {
        let (repo, notifier, _) = setup().await;

        let err = AnswerEvaluator::for_mode(LearningMode::Flashcards)
            .evaluate(repo.as_ref(), &notifier, "u1", 999, "dog", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(repo.logs().await.is_empty());
    }
}
