//! Daily challenge endpoints

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::challenge;
use crate::AppState;

/// GET /api/challenge
pub async fn today(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<DailyChallenge>> {
    let mut rng = state.request_rng();
    let today = Utc::now().date_naive();

    let challenge = challenge::get_or_create(
        state.repo.as_ref(),
        &auth.user_id,
        query.language_id,
        today,
        &mut rng,
    )
    .await?
    .ok_or_else(|| {
        ApiError::NoCandidates("No words found for the selected language.".to_string())
    })?;

    Ok(Json(challenge))
}

/// POST /api/challenge/:id/complete
pub async fn complete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(challenge_id): Path<i64>,
) -> Result<Json<DailyChallenge>> {
    let challenge = challenge::complete(state.repo.as_ref(), &auth.user_id, challenge_id).await?;

    Ok(Json(challenge))
}
