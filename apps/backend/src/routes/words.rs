//! Word endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/words
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<WordListResponse>> {
    let words = state.repo.get_words_for_language(query.language_id).await?;

    Ok(Json(WordListResponse { words }))
}

/// GET /api/words/:id
pub async fn get(State(state): State<AppState>, Path(word_id): Path<i64>) -> Result<Json<Word>> {
    let word = state
        .repo
        .get_word(word_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Word {} not found", word_id)))?;

    Ok(Json(word))
}
