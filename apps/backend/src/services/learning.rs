//! Learning session orchestration.
//!
//! Sessions are stored per user through [`SessionRepository`]; every
//! operation after `start` receives the [`SessionState`] explicitly.
//!
//! [`SessionRepository`]: crate::db::SessionRepository

use chrono::{DateTime, Utc};
use learning_core::{build_options, pick_word, LearningError, DISTRACTOR_COUNT};
use rand::Rng;

use crate::db::LearningRepository;
use crate::error::{ApiError, Result};
use crate::models::{LearningResult, Question, SessionScope, SessionState, Word};
use crate::services::evaluator::AnswerEvaluator;
use crate::services::notifier::ActivityNotifier;
use crate::services::repetition::words_to_repeat;

pub const NO_ACTIVE_SESSION: &str = "No active session.";

// Extra candidates make up for translations that duplicate the answer.
const DISTRACTOR_POOL: usize = DISTRACTOR_COUNT * 3;

pub struct LearningService<'a, R: ?Sized> {
    repo: &'a R,
    notifier: &'a ActivityNotifier,
}

impl<'a, R> LearningService<'a, R>
where
    R: LearningRepository + ?Sized,
{
    pub fn new(repo: &'a R, notifier: &'a ActivityNotifier) -> Self {
        Self { repo, notifier }
    }

    /// Validate the request and store it as the user's active session,
    /// replacing any previous one. Nothing is stored when validation fails.
    pub async fn start(
        &self,
        user_id: &str,
        language_id: i64,
        scope: Option<SessionScope>,
        mode: Option<&str>,
        is_repeat: bool,
    ) -> Result<SessionState> {
        let state = learning_core::start_session(language_id, scope, mode, is_repeat)?;
        self.repo.save_session(user_id, &state).await?;

        tracing::info!(
            user_id,
            language_id,
            scope = state.scope.kind(),
            mode = state.mode.as_str(),
            is_repeat = state.is_repeat,
            "learning session started"
        );

        Ok(state)
    }

    /// The user's active session.
    pub async fn current(&self, user_id: &str) -> Result<SessionState> {
        self.repo
            .get_session(user_id)
            .await?
            .ok_or_else(|| ApiError::Validation(NO_ACTIVE_SESSION.to_string()))
    }

    /// Drop the user's session. Returns whether one was active.
    pub async fn end(&self, user_id: &str) -> Result<bool> {
        self.repo.clear_session(user_id).await
    }

    /// Pick the next word to present, uniformly among the session's candidates.
    pub async fn next_word<G>(
        &self,
        user_id: &str,
        session: &SessionState,
        rng: &mut G,
        now: DateTime<Utc>,
    ) -> Result<Question>
    where
        G: Rng + Send + ?Sized,
    {
        let candidates = self.candidates(user_id, session, now).await?;
        let word = pick_word(&candidates, rng)
            .cloned()
            .ok_or_else(|| LearningError::NoCandidates(no_candidates_message(session)))?;

        let options = if session.mode.presents_options() {
            let others = self
                .repo
                .get_random_words_excluding(session.language_id, word.id, DISTRACTOR_POOL)
                .await?;
            Some(build_options(
                &word.translation,
                others.into_iter().map(|w| w.translation),
                rng,
            ))
        } else {
            None
        };

        Ok(Question {
            word_id: word.id,
            original: word.original,
            mode: session.mode,
            is_repeat: session.is_repeat,
            options,
        })
    }

    /// Evaluate an answer in the session's mode.
    ///
    /// A correct answer in a repeat session marks one outstanding mistake on
    /// the word as corrected.
    pub async fn submit_answer(
        &self,
        user_id: &str,
        session: &SessionState,
        word_id: i64,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<LearningResult> {
        let result = AnswerEvaluator::for_mode(session.mode)
            .evaluate(self.repo, self.notifier, user_id, word_id, answer, now)
            .await?;

        if session.is_repeat && result.is_correct {
            let corrected = self.repo.mark_corrected(user_id, word_id).await?;
            tracing::debug!(user_id, word_id, corrected, "repeat answer correct");
        }

        Ok(result)
    }

    async fn candidates(
        &self,
        user_id: &str,
        session: &SessionState,
        now: DateTime<Utc>,
    ) -> Result<Vec<Word>> {
        let words = if session.is_repeat {
            words_to_repeat(self.repo, user_id, session.language_id, now).await?
        } else {
            match session.scope {
                SessionScope::Group(group_id) => self
                    .repo
                    .get_group_with_words(group_id)
                    .await?
                    .filter(|g| g.user_id == user_id && g.language_id == session.language_id)
                    .map(|g| g.words)
                    .unwrap_or_default(),
                SessionScope::All | SessionScope::Repeatable => {
                    self.repo.get_words_for_language(session.language_id).await?
                }
            }
        };

        if words.is_empty() {
            return Err(LearningError::NoCandidates(no_candidates_message(session)).into());
        }
        Ok(words)
    }
}

fn no_candidates_message(session: &SessionState) -> String {
    let message = match session.scope {
        _ if session.is_repeat => "No repeatable words available.",
        SessionScope::Group(_) => "No words found in the selected group.",
        SessionScope::All | SessionScope::Repeatable => "No words found for the selected language.",
    };
    message.to_string()
}
