//! Registration, login, token authentication and self-service profile
//! changes.

use chrono::Utc;
use scribe_core::auth::{validate_credentials, AccessToken, Credentials};
use scribe_core::blog::{
    validate_user_changes, NewUser, UpdateProfileRequest, User, UserChanges, UserId, UserLookup,
    UserProfile,
};
use scribe_core::storage::RepositoryError;

use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::token::{issue_token, verify_token};
use crate::{AuthError, AuthState};

fn email_conflict(err: RepositoryError) -> AuthError {
    match err {
        RepositoryError::AlreadyExists { .. } => AuthError::UserAlreadyExists,
        other => AuthError::Repository(other),
    }
}

impl AuthState {
    /// Creates an account and returns its public profile.
    pub async fn register(&self, credentials: Credentials) -> Result<UserProfile, AuthError> {
        validate_credentials(&credentials)?;

        let lookup = UserLookup::email(&credentials.email);
        if self.users.find_user(&lookup).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let hashed_password = hash_password_blocking(credentials.password).await?;
        let user = self
            .users
            .create_user(&NewUser {
                email: credentials.email,
                hashed_password,
            })
            .await
            .map_err(email_conflict)?;

        tracing::info!(user_id = user.id, "Registered user");
        Ok(user.profile())
    }

    /// Exchanges credentials for an access token.
    ///
    /// An unknown email surfaces as the repository's `User not found`.
    pub async fn login(&self, credentials: Credentials) -> Result<AccessToken, AuthError> {
        let user = self
            .users
            .require_user(&UserLookup::email(&credentials.email))
            .await?;

        let matches =
            verify_password_blocking(credentials.password, user.hashed_password.clone()).await?;
        if !matches {
            tracing::debug!(user_id = user.id, "Login with wrong password");
            return Err(AuthError::InvalidPassword);
        }

        let access_token = issue_token(&self.config, user.id, Utc::now())?;
        tracing::info!(user_id = user.id, "User logged in");

        Ok(AccessToken { access_token })
    }

    /// Resolves a bearer token to the user it was issued to.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = verify_token(&self.config, token, Utc::now())?;

        self.users
            .find_user(&UserLookup::id(claims.sub))
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Changes the email and/or password of `user_id`.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, AuthError> {
        let hashed_password = match request.password {
            Some(password) => Some(hash_password_blocking(password).await?),
            None => None,
        };
        let changes = UserChanges {
            email: request.email,
            hashed_password,
        };
        validate_user_changes(&changes)?;

        self.users
            .update_user(user_id, &changes)
            .await
            .map_err(email_conflict)?;

        tracing::info!(user_id, "Updated user profile");

        let user = self.users.require_user(&UserLookup::id(user_id)).await?;
        Ok(user.profile())
    }
}
