use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or bad credentials, or a guard refused the caller. Never says which.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("User not found: {0}")]
    NotFound(i32),

    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("Store error: {0}")]
    Store(#[from] DbErr),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(msg) => {
                tracing::info!("Validation error: {}", msg);
                AppError::BadRequest(msg)
            }
            UserError::BadRequest(msg) => AppError::BadRequest(msg),
            UserError::Unauthorized => AppError::Unauthorized,
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::DuplicateUsername(username) => {
                AppError::Conflict(format!("Username '{}' is already taken", username))
            }
            UserError::Store(e) => AppError::InternalServerError(format!("Store error: {}", e)),
            UserError::PasswordHash(msg) => {
                AppError::InternalServerError(format!("Password hashing error: {}", msg))
            }
            UserError::Token(msg) => AppError::InternalServerError(format!("Token error: {}", msg)),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
