use std::time::Duration;

const DEV_JWT_SECRET: &str = "scribe-dev-secret-change-me";

/// Token signing configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens.
    pub jwt_secret: String,
    /// Lifetime of an issued access token.
    pub token_ttl: Duration,
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `JWT_SECRET`: HMAC secret for access tokens (default: a development secret)
    /// - `JWT_EXPIRATION_TIME`: Token lifetime in seconds (default: 86400)
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let token_ttl = std::env::var("JWT_EXPIRATION_TIME")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(86_400));

        Self {
            jwt_secret,
            token_ttl,
        }
    }

    /// Creates a config with an explicit secret and a one-day token lifetime.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            token_ttl: Duration::from_secs(86_400),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}
