//! In-memory cache backend implementation.
//!
//! Provides a process-local cache with TTL support for single-instance
//! deployments.

mod cache;

pub use cache::MemoryCache;
