//! Activity reports.

use chrono::{DateTime, Utc};

use crate::db::ActivityLogRepository;
use crate::error::{ApiError, Result};
use crate::models::ActivityReport;

pub const DEFAULT_REPORT_DAYS: u32 = 7;
pub const MAX_REPORT_DAYS: u32 = 365;

/// Answer counts for a user and language over the trailing `days`.
pub async fn activity_report<R>(
    repo: &R,
    user_id: &str,
    language_id: i64,
    days: Option<u32>,
    now: DateTime<Utc>,
) -> Result<ActivityReport>
where
    R: ActivityLogRepository + ?Sized,
{
    let days = days.unwrap_or(DEFAULT_REPORT_DAYS);
    if !(1..=MAX_REPORT_DAYS).contains(&days) {
        return Err(ApiError::Validation(format!(
            "days must be between 1 and {}",
            MAX_REPORT_DAYS
        )));
    }

    let logs = repo
        .get_recent_logs(user_id, language_id, i64::from(days), now)
        .await?;

    Ok(ActivityReport::from_entries(days, &logs))
}
