//! Test fixtures and factory functions for creating test data.

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use vocab_trainer_backend::db::MemoryRepository;
use vocab_trainer_backend::models::{ActivityLogEntry, Word};

pub const LANGUAGE_ID: i64 = 1;
pub const OTHER_LANGUAGE_ID: i64 = 2;

/// Sample Polish vocabulary, original and translation.
pub const ANIMALS: [(&str, &str); 5] = [
    ("pies", "dog"),
    ("kot", "cat"),
    ("koń", "horse"),
    ("mysz", "mouse"),
    ("ptak", "bird"),
];

/// Insert the given pairs into a language.
pub async fn seed_words(repo: &MemoryRepository, language_id: i64, pairs: &[(&str, &str)]) -> Vec<Word> {
    let mut words = Vec::with_capacity(pairs.len());
    for (original, translation) in pairs {
        words.push(repo.insert_word(original, translation, language_id).await);
    }
    words
}

/// Wrong, uncorrected answer logged `days_ago` days in the past.
pub fn past_failure(user_id: &str, word_id: i64, days_ago: i64) -> ActivityLogEntry {
    ActivityLogEntry {
        id: 0,
        user_id: user_id.to_string(),
        word_id,
        is_correct: false,
        corrected: false,
        timestamp: Utc::now() - Duration::days(days_ago),
    }
}

/// Body for POST /api/learning/session.
pub fn start_session(scope: Option<Value>, mode: Option<&str>, is_repeat: bool) -> Value {
    json!({
        "language_id": LANGUAGE_ID,
        "scope": scope,
        "mode": mode,
        "is_repeat": is_repeat,
    })
}

pub fn group_scope(group_id: i64) -> Value {
    json!({ "group": group_id })
}

pub fn answer(word_id: i64, answer: &str) -> Value {
    json!({ "word_id": word_id, "answer": answer })
}
