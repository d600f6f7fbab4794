//! Learning session endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::learning::LearningService;
use crate::services::repetition::words_to_repeat;
use crate::AppState;

/// POST /api/learning/session
pub async fn start_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<SessionState>> {
    let service = LearningService::new(state.repo.as_ref(), &state.notifier);
    let session = service
        .start(
            &auth.user_id,
            payload.language_id,
            payload.scope,
            payload.mode.as_deref(),
            payload.is_repeat,
        )
        .await?;

    Ok(Json(session))
}

/// DELETE /api/learning/session
pub async fn end_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<EndSessionResponse>> {
    let service = LearningService::new(state.repo.as_ref(), &state.notifier);
    let ended = service.end(&auth.user_id).await?;

    Ok(Json(EndSessionResponse { ended }))
}

/// GET /api/learning/question
pub async fn question(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Question>> {
    let service = LearningService::new(state.repo.as_ref(), &state.notifier);
    let session = service.current(&auth.user_id).await?;

    let mut rng = state.request_rng();
    let question = service
        .next_word(&auth.user_id, &session, &mut rng, Utc::now())
        .await?;

    Ok(Json(question))
}

/// POST /api/learning/answer
pub async fn answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<LearningResult>> {
    let service = LearningService::new(state.repo.as_ref(), &state.notifier);
    let session = service.current(&auth.user_id).await?;

    let result = service
        .submit_answer(
            &auth.user_id,
            &session,
            payload.word_id,
            &payload.answer,
            Utc::now(),
        )
        .await?;

    Ok(Json(result))
}

/// GET /api/learning/repeatable
pub async fn repeatable(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<WordListResponse>> {
    let words = words_to_repeat(
        state.repo.as_ref(),
        &auth.user_id,
        query.language_id,
        Utc::now(),
    )
    .await?;

    Ok(Json(WordListResponse { words }))
}
