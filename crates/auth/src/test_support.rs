//! Minimal user store for the crate's unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use scribe_core::auth::Credentials;
use scribe_core::blog::{apply_user_changes, NewUser, User, UserChanges, UserId, UserLookup};
use scribe_core::serde::current_timestamp;
use scribe_core::storage::{RepositoryError, Result, UserRepository};

use crate::{AuthConfig, AuthState};

#[derive(Default)]
pub struct TestUsers {
    users: RwLock<BTreeMap<UserId, User>>,
}

fn email_taken(users: &BTreeMap<UserId, User>, email: &str, except: Option<UserId>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for TestUsers {
    async fn find_users(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(match lookup {
            UserLookup::Id { id } => users.get(id).cloned(),
            UserLookup::Email { email } => users.values().find(|u| &u.email == email).cloned(),
        })
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.email.clone(),
            });
        }
        let now = current_timestamp();
        let created = User {
            id: users.keys().next_back().map_or(1, |id| id + 1),
            email: user.email.clone(),
            hashed_password: user.hashed_password.clone(),
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: UserId, changes: &UserChanges) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(email) = &changes.email {
            if email_taken(&users, email, Some(id)) {
                return Err(RepositoryError::AlreadyExists {
                    entity_type: "User",
                    id: email.clone(),
                });
            }
        }
        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound {
            entity_type: "User",
            id: id.to_string(),
        })?;
        apply_user_changes(user, changes, current_timestamp());
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound {
                entity_type: "User",
                id: id.to_string(),
            })
    }
}

pub fn auth_state() -> AuthState {
    AuthState::new(
        Arc::new(TestUsers::default()),
        AuthConfig::with_secret("test-secret"),
    )
}

pub fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}
