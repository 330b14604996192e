//! crates/quiz_core/src/error.rs

use crate::ports::PortError;

/// Failures surfaced by [`crate::service::QuizService`].
///
/// An empty question list is a normal outcome and never shows up here.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Knowledge store failure: {0}")]
    Storage(#[from] PortError),
}

pub type QuizResult<T> = Result<T, QuizError>;
