//! Functional core for scribe.
//!
//! Domain types, cache key derivation and invalidation strategies, and the
//! repository and cache traits that the server crate implements. Nothing in
//! here performs I/O directly.

pub mod auth;
pub mod blog;
pub mod cache;
pub mod serde;
pub mod storage;
