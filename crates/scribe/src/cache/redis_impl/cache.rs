//! Redis cache implementation.
//!
//! Index sets are native Redis sets. Listings are enumerated with `SCAN`
//! rather than `KEYS` so invalidation never blocks the server.
//!
//! Multi-command operations are not atomic. A crash between commands can
//! leave a stale index member or an untracked value; both resolve through
//! TTL expiry or the next invalidation.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;

use scribe_core::cache::{Cache, Result};

use super::error::map_redis_error;

/// Redis cache backend using a connection manager for reconnects.
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();

        match ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.clone();
        conn.del::<_, ()>(keys).await.map_err(map_redis_error)
    }

    async fn add_to_set(&self, set_key: &str, members: &[String]) -> Result<()> {
        if members.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.clone();
        conn.sadd::<_, _, ()>(set_key, members)
            .await
            .map_err(map_redis_error)
    }

    async fn members_of(&self, set_key: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        conn.smembers(set_key).await.map_err(map_redis_error)
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let iter = conn
            .scan_match::<_, String>(pattern)
            .await
            .map_err(map_redis_error)?;
        let mut keys: Vec<String> = iter.collect().await;
        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// Skip test if Redis not available.
    async fn get_test_cache() -> Option<RedisCache> {
        let cache = RedisCache::new(&redis_url()).await.ok()?;
        cache.ping().await.ok()?;
        Some(cache)
    }

    /// Unique prefix so concurrent tests never collide.
    fn test_key(suffix: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("test:redis_cache:{nanos}:{suffix}")
    }

    #[tokio::test]
    async fn test_redis_set_get_delete() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("set_get");
        cache.set(&key, b"hello world", None).await.unwrap();
        assert_eq!(
            cache.get(&key).await.unwrap(),
            Some(b"hello world".to_vec())
        );

        cache.delete(std::slice::from_ref(&key)).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_ttl() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("ttl");
        cache
            .set(&key, b"expiring", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_sets() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let set_key = test_key("index");
        let members = vec![test_key("a"), test_key("b")];
        cache.add_to_set(&set_key, &members).await.unwrap();

        let mut found = cache.members_of(&set_key).await.unwrap();
        found.sort();
        let mut expected = members.clone();
        expected.sort();
        assert_eq!(found, expected);

        cache.delete(std::slice::from_ref(&set_key)).await.unwrap();
        assert!(cache.members_of(&set_key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redis_delete_pattern() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let prefix = test_key("pattern");
        let first = format!("{prefix}:lists:1");
        let second = format!("{prefix}:lists:2");
        let other = format!("{prefix}:single");

        cache.set(&first, b"1", None).await.unwrap();
        cache.set(&second, b"2", None).await.unwrap();
        cache.set(&other, b"3", None).await.unwrap();

        cache
            .delete_pattern(&format!("{prefix}:lists:*"))
            .await
            .unwrap();

        assert!(cache.get(&first).await.unwrap().is_none());
        assert!(cache.get(&second).await.unwrap().is_none());
        assert!(cache.get(&other).await.unwrap().is_some());

        cache.delete(&[other]).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_binary_data() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("binary");
        let value: Vec<u8> = (0..=255).collect();

        cache.set(&key, &value, None).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(value));

        cache.delete(&[key]).await.unwrap();
    }
}
