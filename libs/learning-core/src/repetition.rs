//! Selection of words due for repetition from the activity log.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use crate::types::ActivityLogEntry;

/// Trailing window, in days, of mistakes that are brought back for repetition.
pub const REPEAT_WINDOW_DAYS: i64 = 7;

/// Earliest timestamp still inside a window of `days` ending at `now`.
pub fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

/// Whether `timestamp` falls in `[now - days, now]`, both ends inclusive.
pub fn in_window(timestamp: DateTime<Utc>, now: DateTime<Utc>, days: i64) -> bool {
    timestamp >= window_start(now, days) && timestamp <= now
}

/// Word ids with an uncorrected wrong answer inside the repeat window.
///
/// Entries are expected to be scoped to one user and language already; each
/// word appears once however many times it was missed.
pub fn repeatable_word_ids(entries: &[ActivityLogEntry], now: DateTime<Utc>) -> BTreeSet<i64> {
    entries
        .iter()
        .filter(|e| in_window(e.timestamp, now, REPEAT_WINDOW_DAYS))
        .filter(|e| e.is_outstanding())
        .map(|e| e.word_id)
        .collect()
}
