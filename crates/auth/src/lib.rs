//! Password and token authentication for scribe.
//!
//! This crate provides:
//! - Argon2id password hashing
//! - HS256 access tokens
//! - Register/login handlers and the `CurrentUser` extractor

mod config;
mod error;
mod extractors;
mod handlers;
mod password;
mod service;
mod state;
mod token;

#[cfg(test)]
mod test_support;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::CurrentUser;
pub use handlers::auth_routes;
pub use password::{hash_password, verify_password};
pub use state::AuthState;
pub use token::{issue_token, verify_token};
