use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    /// A precondition was violated: missing field, inverted time range,
    /// start in the past, empty roster, feedback on an open session.
    #[error("Invalid request: {0}")]
    Invalid(String),

    /// A referenced instructor, trainee or session does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Invalid(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    /// Failures caused by the request itself rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Invalid(_) | AppError::NotFound(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::Sqlx(err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Invalid(errors.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
