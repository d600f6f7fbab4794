//! Report endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::reports::activity_report;
use crate::AppState;

/// GET /api/reports/activity
pub async fn activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<ActivityReportQuery>,
) -> Result<Json<ActivityReport>> {
    let report = activity_report(
        state.repo.as_ref(),
        &auth.user_id,
        query.language_id,
        query.days,
        Utc::now(),
    )
    .await?;

    Ok(Json(report))
}
