//! Cached user repository decorator.

use std::sync::Arc;

use async_trait::async_trait;

use scribe_core::blog::{NewUser, User, UserChanges, UserId, UserLookup};
use scribe_core::cache::{
    ArticleCacheStrategy, Cache, CacheFailurePolicy, CacheStrategy, UserCacheStrategy,
};
use scribe_core::storage::{Result, UserRepository};

use super::CacheAccess;

/// Cached user repository decorator.
///
/// Single-user reads are registered under `user:keys:<id>` before they are
/// stored, so an update or delete drops every lookup (by id or by email)
/// that resolved to that user.
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
/// * `C` - The cache implementation
pub struct CachedUserRepository<R, C>
where
    R: UserRepository,
    C: Cache,
{
    repository: Arc<R>,
    access: CacheAccess<C>,
    strategy: UserCacheStrategy,
    articles: ArticleCacheStrategy,
}

impl<R, C> CachedUserRepository<R, C>
where
    R: UserRepository,
    C: Cache,
{
    /// Creates a new cached user repository.
    ///
    /// `articles` must match the strategy of the article decorator sharing
    /// this cache, since an email change drops its cached listings.
    pub fn new(
        repository: Arc<R>,
        cache: Arc<C>,
        strategy: UserCacheStrategy,
        articles: ArticleCacheStrategy,
        policy: CacheFailurePolicy,
    ) -> Self {
        Self {
            repository,
            access: CacheAccess::new(cache, policy),
            strategy,
            articles,
        }
    }
}

#[async_trait]
impl<R, C> UserRepository for CachedUserRepository<R, C>
where
    R: UserRepository + 'static,
    C: Cache + 'static,
{
    async fn find_users(&self) -> Result<Vec<User>> {
        let Some(key) = self.access.check(self.strategy.key_for_all(&()), "key")? else {
            return self.repository.find_users().await;
        };

        if let Some(users) = self.access.read::<Vec<User>>(&key).await? {
            tracing::trace!(key = %key, "Cache hit for users");
            return Ok(users);
        }

        tracing::trace!(key = %key, "Cache miss for users");
        let users = self.repository.find_users().await?;

        if !users.is_empty() {
            self.access
                .write(&key, &users, self.strategy.ttl())
                .await?;
        }

        Ok(users)
    }

    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<User>> {
        let Some(key) = self.access.check(self.strategy.key_for_one(lookup), "key")? else {
            return self.repository.find_user(lookup).await;
        };

        if let Some(user) = self.access.read::<User>(&key).await? {
            tracing::trace!(key = %key, "Cache hit for user");
            return Ok(Some(user));
        }

        tracing::trace!(key = %key, "Cache miss for user");
        let user = self.repository.find_user(lookup).await?;

        if let Some(ref u) = user {
            let index = [self.strategy.index_key_for(u.id)];
            self.access
                .write_tracked(&index, &key, u, self.strategy.ttl())
                .await?;
        }

        Ok(user)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        // 1. Persist to storage
        let created = self.repository.create_user(user).await?;

        // 2. Drop the listing that is now missing this user
        self.access
            .invalidated(self.strategy.invalidate_all(self.access.store()).await)?;

        tracing::debug!(user_id = created.id, "User created");

        // 3. Read back through the cache
        self.require_user(&UserLookup::id(created.id)).await
    }

    async fn update_user(&self, id: UserId, changes: &UserChanges) -> Result<()> {
        self.repository.update_user(id, changes).await?;

        self.access
            .invalidated(self.strategy.invalidate_one(self.access.store(), id).await)?;

        // Article listings embed the author's email
        if changes.email.is_some() {
            self.access
                .invalidated(self.articles.invalidate_all(self.access.store()).await)?;
        }

        tracing::debug!(user_id = id, "User updated");
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        self.repository.delete_user(id).await?;

        self.access
            .invalidated(self.strategy.invalidate_one(self.access.store(), id).await)?;

        tracing::debug!(user_id = id, "User deleted");
        Ok(())
    }
}
