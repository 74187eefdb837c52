//! HTTP handlers for auth routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use scribe_core::auth::{AccessToken, Credentials};
use scribe_core::blog::UserProfile;

use crate::error::AuthError;
use crate::extractors::CurrentUser;
use crate::AuthState;

/// Creates the auth router.
///
/// Routes:
/// - `POST /auth/register` - Create an account (201 with the public profile)
/// - `POST /auth/login` - Exchange credentials for `{"accessToken": ...}`
/// - `GET /auth/me` - Profile of the bearer of the token
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    body.map(|Json(value)| value)
        .map_err(|e| AuthError::InvalidInput(e.body_text()))
}

async fn register(
    State(state): State<AuthState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>), AuthError> {
    let credentials = parse_body(body)?;
    let profile = state.register(credentials).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn login(
    State(state): State<AuthState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AccessToken>, AuthError> {
    let credentials = parse_body(body)?;
    Ok(Json(state.login(credentials).await?))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(user.profile())
}
