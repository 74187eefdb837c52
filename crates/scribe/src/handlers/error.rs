use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scribe_auth::AuthError;
use scribe_core::blog::ValidationError;
use scribe_core::storage::{
    repository_error_to_status_code, ErrorBody, PaginationError, RepositoryError,
};

/// Handler error that wraps `anyhow::Error`.
///
/// Known error types are recovered by downcasting and mapped to their HTTP
/// status; anything else is a 500. The body is always an [`ErrorBody`].
pub struct AppError(pub anyhow::Error);

/// Malformed path, query or body. Always a 400.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BadRequest(pub String);

impl From<JsonRejection> for BadRequest {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection.body_text())
    }
}

impl From<QueryRejection> for BadRequest {
    fn from(rejection: QueryRejection) -> Self {
        Self(rejection.body_text())
    }
}

impl From<PathRejection> for BadRequest {
    fn from(rejection: PathRejection) -> Self {
        Self(rejection.body_text())
    }
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            let code = repository_error_to_status_code(repo_error);
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        } else if let Some(auth_error) = self.0.downcast_ref::<AuthError>() {
            auth_error.status_code()
        } else if self.0.is::<ValidationError>()
            || self.0.is::<PaginationError>()
            || self.0.is::<BadRequest>()
        {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR
            && !self.0.is::<RepositoryError>()
        {
            tracing::error!(error = %self.0, "Unhandled application error");
            "Internal server error".to_string()
        } else {
            if status.is_server_error() {
                tracing::error!(status = status.as_u16(), error = %self.0, "Request failed");
            }
            self.0.to_string()
        };

        (status, Json(ErrorBody::new(status.as_u16(), message))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
