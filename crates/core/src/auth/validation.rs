use crate::blog::{validate_email, ValidationError};

use super::Credentials;

/// Validates credentials before they reach the repository or the hasher.
///
/// # Examples
///
/// ```
/// use scribe_core::auth::{validate_credentials, Credentials};
///
/// let credentials = Credentials {
///     email: "a@x.com".to_string(),
///     password: "p".to_string(),
/// };
/// assert!(validate_credentials(&credentials).is_ok());
/// ```
pub fn validate_credentials(credentials: &Credentials) -> Result<(), ValidationError> {
    validate_email(&credentials.email)?;
    if credentials.password.is_empty() {
        return Err(ValidationError::EmptyField("password"));
    }
    Ok(())
}
