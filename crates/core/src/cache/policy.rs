use std::{fmt, str::FromStr};

/// What a cached repository does when the cache store itself fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheFailurePolicy {
    /// Fail the request with `RepositoryError::CacheUnavailable`.
    #[default]
    Fail,
    /// Log the failure and serve the request from the repository.
    Bypass,
}

impl FromStr for CacheFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "bypass" => Ok(Self::Bypass),
            other => Err(format!("unknown cache failure policy: {other}")),
        }
    }
}

impl fmt::Display for CacheFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::Bypass => write!(f, "bypass"),
        }
    }
}
