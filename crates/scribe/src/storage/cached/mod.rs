//! Cached repository decorators.
//!
//! This module provides decorator implementations that wrap repository traits
//! with caching behavior. The decorators implement read-through /
//! write-invalidate:
//!
//! - **Reads**: Check cache first, on miss fetch from repository and populate
//!   the cache. Absent entities are never cached.
//! - **Writes**: Persist to repository, then invalidate. A failed write
//!   invalidates nothing.
//!
//! Cache store failures follow the configured [`CacheFailurePolicy`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! let repo = Arc::new(SqliteRepository::new("scribe.db").await?);
//! let cache = Arc::new(MemoryCache::new(10_000));
//!
//! let users = CachedUserRepository::new(
//!     repo,
//!     cache,
//!     UserCacheStrategy::default(),
//!     ArticleCacheStrategy::default(),
//!     policy,
//! );
//! ```

mod article;
mod user;

#[cfg(all(test, feature = "memory"))]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use scribe_core::cache::{
    deserialize_value, serialize_value, Cache, CacheFailurePolicy, Result as CacheResult,
};
use scribe_core::storage::{RepositoryError, Result};

pub use article::CachedArticleRepository;
pub use user::CachedUserRepository;

/// Cache handle plus the policy deciding what a store failure means.
///
/// A bypassed failure behaves like a miss (reads) or a no-op (writes); under
/// `Fail` it surfaces as `RepositoryError::CacheUnavailable`.
struct CacheAccess<C: Cache> {
    cache: Arc<C>,
    policy: CacheFailurePolicy,
}

impl<C: Cache> CacheAccess<C> {
    fn new(cache: Arc<C>, policy: CacheFailurePolicy) -> Self {
        Self { cache, policy }
    }

    fn store(&self) -> &dyn Cache {
        &*self.cache
    }

    /// Applies the failure policy to a cache result.
    fn check<T>(&self, result: CacheResult<T>, operation: &'static str) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => match self.policy {
                CacheFailurePolicy::Fail => {
                    tracing::error!(operation, error = %err, "Cache operation failed");
                    Err(RepositoryError::from(err))
                }
                CacheFailurePolicy::Bypass => {
                    tracing::warn!(operation, error = %err, "Cache operation failed, bypassing");
                    Ok(None)
                }
            },
        }
    }

    /// Reads and decodes a cached value. Undecodable entries count as a miss.
    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(Some(bytes)) = self.check(self.cache.get(key).await, "get")? else {
            return Ok(None);
        };

        match deserialize_value(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache deserialization failed");
                Ok(None)
            }
        }
    }

    /// Encodes and stores a value with a TTL.
    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let Some(bytes) = self.check(serialize_value(value), "serialize")? else {
            return Ok(());
        };
        self.check(self.cache.set(key, &bytes, Some(ttl)).await, "set")?;
        Ok(())
    }

    /// Registers `key` in every index set, then stores the value.
    ///
    /// If any registration is bypassed the value is not written, so a value
    /// entry never exists without its index membership.
    async fn write_tracked<T: Serialize + ?Sized>(
        &self,
        index_keys: &[String],
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        for index_key in index_keys {
            let added = self.cache.add_to_set(index_key, &[key.to_string()]).await;
            if self.check(added, "add_to_set")?.is_none() {
                return Ok(());
            }
        }
        self.write(key, value, ttl).await
    }

    /// Runs an invalidation step under the failure policy.
    fn invalidated(&self, result: CacheResult<()>) -> Result<()> {
        self.check(result, "invalidate").map(|_| ())
    }
}
