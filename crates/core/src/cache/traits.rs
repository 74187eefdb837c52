use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Key/value store with TTL expiry and auxiliary string sets.
///
/// Absence is never an error: `get` returns `None`, deleting a missing key
/// is a no-op and `members_of` on a missing set returns an empty list.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL, overwriting any
    /// previous value.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes zero or more keys. Both values and sets are removed.
    async fn delete(&self, keys: &[String]) -> Result<()>;

    /// Adds members to the set stored at `set_key`, creating it if needed.
    async fn add_to_set(&self, set_key: &str, members: &[String]) -> Result<()>;

    /// Returns the members of the set stored at `set_key`.
    async fn members_of(&self, set_key: &str) -> Result<Vec<String>>;

    /// Enumerates keys matching a glob pattern (e.g., "articles:*").
    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>>;

    /// Removes every key.
    async fn clear(&self) -> Result<()>;

    /// Checks that the backing store is reachable.
    async fn ping(&self) -> Result<()>;

    /// Deletes all keys matching a pattern.
    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let keys = self.keys_matching(pattern).await?;
        if keys.is_empty() {
            return Ok(());
        }
        self.delete(&keys).await
    }
}
