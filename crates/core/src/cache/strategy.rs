//! Per-entity cache policies.
//!
//! A strategy decides which keys an entity type uses and how far an
//! invalidation fans out. It never talks to the repository.
//!
//! Single-entity entries are tracked precisely: each one is registered in
//! the owning id's index set before it is written, and invalidating the id
//! deletes every member of that set plus the set itself. Listings cannot be
//! tied to ids (one article can appear under any number of filters), so any
//! write drops every listing of that entity type.

use std::time::Duration;

use async_trait::async_trait;

use crate::blog::{ArticleFilter, ArticleLookup, UserLookup};
use crate::storage::Pagination;

use super::{
    article_index_key, article_key, article_list_key, user_index_key, user_key, Cache, Result,
    ALL_USERS_KEY, ARTICLE_LISTS_PATTERN,
};

/// TTL applied to every cached value unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[async_trait]
pub trait CacheStrategy: Send + Sync {
    /// Criteria for a single-entity read.
    type Lookup: Send + Sync;
    /// Parameters of a listing read.
    type ListParams: Send + Sync;

    /// Key for a listing.
    fn key_for_all(&self, params: &Self::ListParams) -> Result<String>;

    /// Key for a single-entity read.
    fn key_for_one(&self, lookup: &Self::Lookup) -> Result<String>;

    /// Key of the index set tracking every key derived from `id`.
    fn index_key_for(&self, id: i64) -> String;

    /// Expiry applied to values written by this strategy.
    fn ttl(&self) -> Duration;

    /// Drops every listing of this entity type.
    async fn invalidate_all(&self, cache: &dyn Cache) -> Result<()>;

    /// Registers `key` under the index set of `id`.
    async fn track(&self, cache: &dyn Cache, id: i64, key: &str) -> Result<()> {
        cache
            .add_to_set(&self.index_key_for(id), &[key.to_string()])
            .await
    }

    /// Drops every tracked key of `id`, the index set itself, then every listing.
    async fn invalidate_one(&self, cache: &dyn Cache, id: i64) -> Result<()> {
        let index_key = self.index_key_for(id);
        let mut keys = cache.members_of(&index_key).await?;
        keys.push(index_key);
        cache.delete(&keys).await?;

        self.invalidate_all(cache).await
    }
}

/// Users are listed without parameters under the fixed `users` key.
#[derive(Debug, Clone, Copy)]
pub struct UserCacheStrategy {
    ttl: Duration,
}

impl UserCacheStrategy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }
}

impl Default for UserCacheStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl CacheStrategy for UserCacheStrategy {
    type Lookup = UserLookup;
    type ListParams = ();

    fn key_for_all(&self, _params: &()) -> Result<String> {
        Ok(ALL_USERS_KEY.to_string())
    }

    fn key_for_one(&self, lookup: &UserLookup) -> Result<String> {
        user_key(lookup)
    }

    fn index_key_for(&self, id: i64) -> String {
        user_index_key(id)
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn invalidate_all(&self, cache: &dyn Cache) -> Result<()> {
        cache.delete(&[ALL_USERS_KEY.to_string()]).await
    }
}

/// Article listings are keyed by pagination and filter, so invalidation
/// has to enumerate them.
#[derive(Debug, Clone, Copy)]
pub struct ArticleCacheStrategy {
    ttl: Duration,
}

impl ArticleCacheStrategy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }
}

impl Default for ArticleCacheStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl CacheStrategy for ArticleCacheStrategy {
    type Lookup = ArticleLookup;
    type ListParams = (Pagination, ArticleFilter);

    fn key_for_all(&self, (pagination, filter): &(Pagination, ArticleFilter)) -> Result<String> {
        article_list_key(pagination, filter)
    }

    fn key_for_one(&self, lookup: &ArticleLookup) -> Result<String> {
        article_key(lookup)
    }

    fn index_key_for(&self, id: i64) -> String {
        article_index_key(id)
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn invalidate_all(&self, cache: &dyn Cache) -> Result<()> {
        cache.delete_pattern(ARTICLE_LISTS_PATTERN).await
    }
}
