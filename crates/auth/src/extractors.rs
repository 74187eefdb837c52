//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use scribe_core::auth::parse_bearer_token;
use scribe_core::blog::User;

use crate::{AuthError, AuthState};

/// Extractor for the authenticated user. Rejects with 401 when the bearer
/// token is missing or invalid.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?;

        let token = header
            .to_str()
            .ok()
            .and_then(parse_bearer_token)
            .ok_or(AuthError::InvalidToken)?;

        let user = auth_state.authenticate(token).await?;

        Ok(CurrentUser(user))
    }
}
