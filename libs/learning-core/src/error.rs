//! Error types for learning-core.

use thiserror::Error;

/// Result type alias using LearningError.
pub type Result<T> = std::result::Result<T, LearningError>;

/// Errors raised by the learning workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LearningError {
    /// Missing or invalid scope/mode when starting a session.
    #[error("{0}")]
    Validation(String),

    #[error("word {0} not found")]
    WordNotFound(i64),

    /// Nothing to study in the requested scope.
    #[error("{0}")]
    NoCandidates(String),
}
