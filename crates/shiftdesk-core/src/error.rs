//! Error kinds surfaced by every core operation

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Core operation errors
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Malformed or missing input (400)
    #[error("{0}")]
    Validation(String),

    /// Referenced entity absent or outside the caller's scope (404)
    #[error("{0}")]
    NotFound(String),

    /// Authenticated but lacking membership or capability (403)
    #[error("{0}")]
    Forbidden(String),

    /// Would violate a uniqueness or state invariant (409)
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

impl ScheduleError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`
    pub(crate) fn from_insert(err: DbErr, conflict_message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::conflict(conflict_message),
            _ => Self::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_constraint_errors_stay_database_errors() {
        let err = ScheduleError::from_insert(
            DbErr::Custom("connection reset".to_string()),
            "Member already exists",
        );

        assert!(matches!(err, ScheduleError::Database(_)));
    }

    #[test]
    fn test_messages_are_passed_through() {
        assert_eq!(
            ScheduleError::forbidden("You are not a member of this workspace.").to_string(),
            "You are not a member of this workspace."
        );
    }
}
