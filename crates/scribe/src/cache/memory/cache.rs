//! In-memory cache implementation with LRU eviction.
//!
//! Values live in an LRU store with lazy TTL expiration. Index sets are kept
//! in a separate map so eviction pressure on values never drops the
//! bookkeeping needed to invalidate them. Set members whose values are gone
//! are pruned as new members are registered, so the set map stays
//! proportional to the live values.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use scribe_core::cache::{pattern_matches, Cache, Result};

/// How long a registered member is kept while its value has not been seen.
///
/// Covers the gap between `add_to_set` and the `set` that follows it.
const REGISTRATION_GRACE: Duration = Duration::from_secs(5);

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    written_at: Instant,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let written_at = Instant::now();
        let expires_at = ttl.map(|d| written_at + d);
        Self {
            value,
            written_at,
            expires_at,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// Set members keyed by member, with the time each was registered.
type Members = HashMap<String, Instant>;

/// Index sets plus the size at which the next full sweep runs.
#[derive(Debug)]
struct IndexSets {
    sets: HashMap<String, Members>,
    sweep_at: usize,
    sweep_floor: usize,
}

impl IndexSets {
    fn new(sweep_floor: usize) -> Self {
        Self {
            sets: HashMap::new(),
            sweep_at: sweep_floor,
            sweep_floor,
        }
    }

    /// Drops dead members from every set and every set left empty.
    fn sweep(&mut self, store: &LruCache<String, CacheEntry>, grace: Duration) {
        let now = Instant::now();
        let before = self.sets.len();
        self.sets.retain(|_, members| {
            prune(members, store, now, grace);
            !members.is_empty()
        });
        self.sweep_at = (self.sets.len() * 2).max(self.sweep_floor);
        tracing::trace!(before, after = self.sets.len(), "Swept index sets");
    }
}

/// A member is live while its value is readable, or while it is still
/// waiting for its first write.
///
/// An expired entry written after the registration means the member's value
/// has come and gone. An older entry, or none at all, falls back to the
/// registration grace.
fn is_live(
    store: &LruCache<String, CacheEntry>,
    key: &str,
    added_at: Instant,
    now: Instant,
    grace: Duration,
) -> bool {
    match store.peek(key) {
        Some(entry) if !entry.is_expired() => true,
        Some(entry) if entry.written_at >= added_at => false,
        _ => now.duration_since(added_at) < grace,
    }
}

fn prune(
    members: &mut Members,
    store: &LruCache<String, CacheEntry>,
    now: Instant,
    grace: Duration,
) {
    members.retain(|key, added_at| is_live(store, key, *added_at, now, grace));
}

/// In-memory cache with LRU eviction.
///
/// Expired entries are treated as absent on access and dropped lazily.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    index: Arc<RwLock<IndexSets>>,
    registration_grace: Duration,
}

impl MemoryCache {
    /// Creates a new in-memory cache holding at most `max_entries` values.
    /// A capacity of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        Self::with_registration_grace(max_entries, REGISTRATION_GRACE)
    }

    fn with_registration_grace(max_entries: usize, registration_grace: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            index: Arc::new(RwLock::new(IndexSets::new(capacity.get()))),
            registration_grace,
        }
    }

    #[cfg(test)]
    async fn set_count(&self) -> usize {
        self.index.read().await.sets.len()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;

        match store.get(key) {
            Some(entry) if entry.is_expired() => {
                store.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.write().await;
        store.put(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        {
            let mut store = self.store.write().await;
            for key in keys {
                store.pop(key);
            }
        }

        let mut index = self.index.write().await;
        for key in keys {
            index.sets.remove(key);
        }

        Ok(())
    }

    async fn add_to_set(&self, set_key: &str, members: &[String]) -> Result<()> {
        let mut index = self.index.write().await;
        let store = self.store.read().await;
        let grace = self.registration_grace;

        if index.sets.len() >= index.sweep_at {
            index.sweep(&store, grace);
        }

        let now = Instant::now();
        let set = index.sets.entry(set_key.to_string()).or_default();
        prune(set, &store, now, grace);
        for member in members {
            set.insert(member.clone(), now);
        }
        Ok(())
    }

    async fn members_of(&self, set_key: &str) -> Result<Vec<String>> {
        let index = self.index.read().await;
        Ok(index
            .sets
            .get(set_key)
            .map(|members| members.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>> {
        let mut keys: Vec<String> = {
            let store = self.store.read().await;
            store
                .iter()
                .filter(|(key, entry)| !entry.is_expired() && pattern_matches(pattern, key))
                .map(|(key, _)| key.clone())
                .collect()
        };

        let index = self.index.read().await;
        keys.extend(
            index
                .sets
                .keys()
                .filter(|key| pattern_matches(pattern, key))
                .cloned(),
        );

        Ok(keys)
    }

    async fn clear(&self) -> Result<()> {
        self.store.write().await.clear();
        self.index.write().await.sets.clear();
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
