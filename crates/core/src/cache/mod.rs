mod error;
mod keys;
mod patterns;
mod policy;
mod serialization;
mod strategy;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    article_index_key, article_key, article_list_key, user_index_key, user_key, ALL_USERS_KEY,
    ARTICLE_LISTS_PATTERN,
};
pub use patterns::pattern_matches;
pub use policy::CacheFailurePolicy;
pub use serialization::{deserialize_value, serialize_value};
pub use strategy::{ArticleCacheStrategy, CacheStrategy, UserCacheStrategy, DEFAULT_TTL};
pub use traits::Cache;
