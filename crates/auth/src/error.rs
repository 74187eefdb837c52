use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scribe_core::blog::ValidationError;
use scribe_core::storage::{repository_error_to_status_code, ErrorBody, RepositoryError};
use thiserror::Error;

/// Auth errors for the scribe_auth crate.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token on a protected request.
    #[error("No token provided")]
    MissingToken,

    /// Bad signature, expired, or the subject no longer exists.
    #[error("Invalid token")]
    InvalidToken,

    /// Login with a known email and the wrong password.
    #[error("Invalid password")]
    InvalidPassword,

    /// Register with an email that is already taken.
    #[error("User already exists")]
    UserAlreadyExists,

    /// Malformed request body.
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Error from the user repository (not found, storage, cache).
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Token(String),
}

impl AuthError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::InvalidPassword => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::UserAlreadyExists
            | AuthError::InvalidInput(_)
            | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Repository(err) => {
                StatusCode::from_u16(repository_error_to_status_code(err))
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AuthError::Hashing(_) | AuthError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Auth error");
            match &self {
                AuthError::Repository(_) => self.to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody::new(status.as_u16(), message))).into_response()
    }
}
