//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. Handlers only ever see the cached repositories, so every
//! read goes through the cache and every write invalidates it. The concrete
//! backend combination is chosen via feature flags.

use std::sync::Arc;

use scribe_auth::AuthState;
use scribe_core::cache::{ArticleCacheStrategy, Cache, UserCacheStrategy};
use scribe_core::storage::{ArticleRepository, UserRepository};

use crate::config::Config;
use crate::storage::cached::{CachedArticleRepository, CachedUserRepository};

// ============================================================================
// Compile-time feature validation
// ============================================================================

// Storage features: exactly one must be enabled, they are mutually exclusive
#[cfg(all(feature = "sqlite", feature = "inmemory"))]
compile_error!("Cannot enable both 'sqlite' and 'inmemory' storage features");

#[cfg(not(any(feature = "inmemory", feature = "sqlite")))]
compile_error!("Must enable exactly one storage feature: 'inmemory' or 'sqlite'");

// Cache features: exactly one must be enabled, they are mutually exclusive
#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!("Cannot enable both 'memory' and 'redis' cache features");

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!("Must enable exactly one cache feature: 'memory' or 'redis'");

/// Shared application state.
///
/// This is cloned for each request handler and contains shared resources
/// including repository trait objects for database access.
#[derive(Clone)]
pub struct AppState {
    /// User repository (cached, wraps underlying storage).
    pub users: Arc<dyn UserRepository>,
    /// Article repository (cached, wraps underlying storage).
    pub articles: Arc<dyn ArticleRepository>,
    /// Cache store shared by both decorators. Used directly by `/readyz`.
    pub cache: Arc<dyn Cache>,
    /// Auth state, backed by the cached user repository.
    pub auth: AuthState,
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

impl AppState {
    /// Wraps one storage backend and one cache store into cached repositories.
    fn build<R, C>(repository: Arc<R>, cache: Arc<C>, config: &Config) -> Self
    where
        R: UserRepository + ArticleRepository + 'static,
        C: Cache + 'static,
    {
        let ttl = config.cache_ttl();
        let policy = config.cache_failure_policy;

        let users: Arc<dyn UserRepository> = Arc::new(CachedUserRepository::new(
            repository.clone(),
            cache.clone(),
            UserCacheStrategy::new(ttl),
            ArticleCacheStrategy::new(ttl),
            policy,
        ));

        let articles: Arc<dyn ArticleRepository> = Arc::new(CachedArticleRepository::new(
            repository,
            cache.clone(),
            ArticleCacheStrategy::new(ttl),
            policy,
        ));

        tracing::debug!(ttl_seconds = ttl.as_secs(), %policy, "Cached repositories ready");

        Self {
            auth: AuthState::new(users.clone(), config.auth.clone()),
            users,
            articles,
            cache,
        }
    }
}

// ============================================================================
// Factory functions for different backend combinations
// ============================================================================

#[cfg(all(feature = "sqlite", feature = "memory"))]
mod sqlite_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage and in-memory cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let sqlite_repo = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            let memory_cache = Arc::new(MemoryCache::new(config.cache_max_entries));

            Ok(Self::build(sqlite_repo, memory_cache, config))
        }
    }
}

#[cfg(all(feature = "sqlite", feature = "redis"))]
mod sqlite_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage and Redis cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let sqlite_repo = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            let redis_cache = Arc::new(RedisCache::new(&config.redis_url).await?);

            Ok(Self::build(sqlite_repo, redis_cache, config))
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "memory"))]
mod inmemory_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage and cache.
        /// Useful for testing without any external dependencies.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let inmemory_repo = Arc::new(InMemoryRepository::new());
            let memory_cache = Arc::new(MemoryCache::new(config.cache_max_entries));

            Ok(Self::build(inmemory_repo, memory_cache, config))
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "redis"))]
mod inmemory_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage and Redis cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let inmemory_repo = Arc::new(InMemoryRepository::new());
            let redis_cache = Arc::new(RedisCache::new(&config.redis_url).await?);

            Ok(Self::build(inmemory_repo, redis_cache, config))
        }
    }
}

// ============================================================================
// Test support
// ============================================================================
