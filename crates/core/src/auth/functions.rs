use chrono::{DateTime, Duration, Utc};

use crate::blog::UserId;

use super::Claims;

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` for other schemes and for an empty token.
pub fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Calculate token expiry from issue time and TTL.
pub fn calculate_expiry(issued_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    issued_at + ttl
}

/// Builds the claims of a token issued to `user_id` at `now`.
pub fn claims_for(user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> Claims {
    Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: calculate_expiry(now, ttl).timestamp(),
    }
}

/// Check if a token's claims have expired.
pub fn is_token_expired(claims: &Claims, now: DateTime<Utc>) -> bool {
    claims.exp <= now.timestamp()
}
