use std::{env, time::Duration};

use scribe_auth::AuthConfig;
use scribe_core::cache::CacheFailurePolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// What to do when the cache store is unreachable (default: fail)
    pub cache_failure_policy: CacheFailurePolicy,
    /// Path to SQLite database file (default: "scribe.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
    /// Token signing settings.
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `CACHE_FAILURE_POLICY` - `fail` or `bypass` (default: `fail`)
    /// - `SQLITE_PATH` - SQLite database path (default: "scribe.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `JWT_SECRET`, `JWT_EXPIRATION_TIME` - see [`AuthConfig::from_env`]
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            cache_failure_policy: env::var("CACHE_FAILURE_POLICY")
                .ok()
                .and_then(|v| match v.parse::<CacheFailurePolicy>() {
                    Ok(policy) => Some(policy),
                    Err(err) => {
                        tracing::warn!(error = %err, "Ignoring CACHE_FAILURE_POLICY");
                        None
                    }
                })
                .unwrap_or_default(),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "scribe.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            auth: AuthConfig::from_env(),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
