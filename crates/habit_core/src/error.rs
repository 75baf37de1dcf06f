use thiserror::Error;

use crate::habit::HabitId;

/// Recoverable failures of store operations. Callers surface these to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HabitError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("no habit with id {id}")]
    NotFound { id: HabitId },
}

impl HabitError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed date key \"{input}\" (expected YYYY-MM-DD)")]
pub struct DateKeyError {
    pub input: String,
}
