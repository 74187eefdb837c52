//! User handlers. Every route requires a bearer token and only ever returns
//! the public profile.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use scribe_auth::CurrentUser;
use scribe_core::blog::{UpdateProfileRequest, UserId, UserLookup, UserProfile};

use crate::{
    handlers::{error::BadRequest, AppError},
    state::AppState,
};

/// List all users (GET /users).
pub async fn list_users(
    CurrentUser(_): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let users = state.users.find_users().await?;
    Ok(Json(users.iter().map(|u| u.profile()).collect()))
}

/// Get a user by id (GET /users/{id}).
pub async fn get_user(
    CurrentUser(_): CurrentUser,
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> Result<Json<UserProfile>, AppError> {
    let Path(id) = id.map_err(BadRequest::from)?;
    let user = state.users.require_user(&UserLookup::id(id)).await?;
    Ok(Json(user.profile()))
}

/// Profile of the caller (GET /users/me).
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(user.profile())
}

/// Change the caller's email and/or password (PUT /users/me).
pub async fn update_me(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserProfile>, AppError> {
    let Json(request) = body.map_err(BadRequest::from)?;
    let profile = state.auth.update_profile(user.id, request).await?;
    Ok(Json(profile))
}

/// Delete the caller's account (DELETE /users/me).
///
/// Rejected with 400 while the user still owns articles.
pub async fn delete_me(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.users.delete_user(user.id).await?;

    tracing::info!(user_id = user.id, "User deleted their account");
    Ok(StatusCode::OK)
}
