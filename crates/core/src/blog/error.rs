use thiserror::Error;

use crate::storage::RepositoryError;

/// Errors raised when request data fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("{0} must be a valid email")]
    InvalidEmail(String),
    #[error("No changes provided")]
    NoChanges,
}

impl From<ValidationError> for RepositoryError {
    fn from(err: ValidationError) -> Self {
        RepositoryError::InvalidData(err.to_string())
    }
}
