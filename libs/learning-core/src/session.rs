//! Learning session start validation.
//!
//! A session has two states: no session, and an active [`SessionState`].
//! Starting is the only transition; sessions end when the caller drops them.

use crate::error::{LearningError, Result};
use crate::types::{LearningMode, SessionScope, SessionState};

pub const MISSING_SCOPE: &str = "You must choose a group, 'All' or the repeatable words to start learning.";
pub const MISSING_MODE: &str = "You must choose a learning mode.";

/// Validate a start request and build the session state.
///
/// The scope is checked before the mode. A repeat session always draws from
/// the repeatable words, whatever scope was passed alongside it, and choosing
/// the repeatable scope implies a repeat session.
pub fn start_session(
    language_id: i64,
    scope: Option<SessionScope>,
    mode: Option<&str>,
    is_repeat: bool,
) -> Result<SessionState> {
    let is_repeat = is_repeat || scope == Some(SessionScope::Repeatable);

    let scope = match scope {
        _ if is_repeat => SessionScope::Repeatable,
        Some(SessionScope::Group(id)) if id <= 0 => {
            return Err(LearningError::Validation(format!("Invalid group id {}.", id)));
        }
        Some(scope) => scope,
        None => return Err(LearningError::Validation(MISSING_SCOPE.to_string())),
    };

    let mode = match mode.map(str::trim).filter(|m| !m.is_empty()) {
        Some(name) => LearningMode::from_name(name).ok_or_else(|| {
            LearningError::Validation(format!("Unknown learning mode '{}'.", name))
        })?,
        None => return Err(LearningError::Validation(MISSING_MODE.to_string())),
    };

    Ok(SessionState {
        language_id,
        scope,
        mode,
        is_repeat,
    })
}
