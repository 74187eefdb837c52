mod functions;
mod types;
mod validation;

pub use functions::{calculate_expiry, claims_for, is_token_expired, parse_bearer_token};
pub use types::{AccessToken, Claims, Credentials};
pub use validation::validate_credentials;
