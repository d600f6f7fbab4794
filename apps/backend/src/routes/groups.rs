//! Group endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/groups
///
/// The user's groups in a language, offered as session scopes.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<GroupListResponse>> {
    let groups = state
        .repo
        .get_groups_for_language(&auth.user_id, query.language_id)
        .await?;

    Ok(Json(GroupListResponse {
        groups: groups.iter().map(GroupSummary::from).collect(),
    }))
}
