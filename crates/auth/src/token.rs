//! HS256 access tokens.
//!
//! `jsonwebtoken` only checks the signature and the presence of `exp`;
//! expiry itself is checked against an explicit `now` so it can be tested.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use scribe_core::auth::{claims_for, is_token_expired, Claims};
use scribe_core::blog::UserId;

use crate::{AuthConfig, AuthError};

/// Issues a signed token for `user_id`.
pub fn issue_token(
    config: &AuthConfig,
    user_id: UserId,
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    let ttl = chrono::Duration::from_std(config.token_ttl)
        .map_err(|e| AuthError::Token(e.to_string()))?;
    let claims = claims_for(user_id, now, ttl);
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Token(e.to_string()))
}

/// Verifies a token's signature and expiry and returns its claims.
pub fn verify_token(
    config: &AuthConfig,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);

    let claims = decode::<Claims>(token, &key, &validation)
        .map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AuthError::InvalidToken
        })?
        .claims;

    if is_token_expired(&claims, now) {
        tracing::debug!(sub = claims.sub, "Token expired");
        return Err(AuthError::InvalidToken);
    }

    Ok(claims)
}
