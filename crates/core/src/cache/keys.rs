//! Cache key derivation.
//!
//! Keys embed the JSON form of the lookup or listing parameters, so two
//! requests with equal parameters always share a key:
//!
//! | key                                   | holds                          |
//! |---------------------------------------|--------------------------------|
//! | `users`                               | every user                     |
//! | `user:<json(where)>`                  | one user                       |
//! | `user:keys:<id>`                      | set of keys derived from a user|
//! | `articles:<json(page)>:<json(filter)>`| one page of articles           |
//! | `article:<json(where)>`               | one article                    |
//! | `article:keys:<id>`                   | set of keys derived from an article |

use serde::Serialize;

use crate::blog::{ArticleFilter, ArticleId, ArticleLookup, UserId, UserLookup};
use crate::storage::Pagination;

use super::{CacheError, Result};

/// Key holding the list of all users.
pub const ALL_USERS_KEY: &str = "users";

/// Pattern matching every article listing key.
pub const ARTICLE_LISTS_PATTERN: &str = "articles:*";

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Returns the cache key for a single user lookup.
///
/// ```
/// use scribe_core::blog::UserLookup;
/// use scribe_core::cache::user_key;
///
/// assert_eq!(user_key(&UserLookup::id(1)).unwrap(), r#"user:{"id":1}"#);
/// ```
pub fn user_key(lookup: &UserLookup) -> Result<String> {
    Ok(format!("user:{}", to_json(lookup)?))
}

/// Returns the index set key tracking every cache key derived from a user.
pub fn user_index_key(id: UserId) -> String {
    format!("user:keys:{}", id)
}

/// Returns the cache key for one page of a filtered article listing.
///
/// ```
/// use scribe_core::blog::ArticleFilter;
/// use scribe_core::cache::article_list_key;
/// use scribe_core::storage::Pagination;
///
/// let key = article_list_key(&Pagination::default(), &ArticleFilter::default()).unwrap();
/// assert_eq!(key, r#"articles:{"page":1,"limit":10}:{}"#);
/// ```
pub fn article_list_key(pagination: &Pagination, filter: &ArticleFilter) -> Result<String> {
    Ok(format!(
        "articles:{}:{}",
        to_json(pagination)?,
        to_json(filter)?
    ))
}

/// Returns the cache key for a single article lookup.
pub fn article_key(lookup: &ArticleLookup) -> Result<String> {
    Ok(format!("article:{}", to_json(lookup)?))
}

/// Returns the index set key tracking every cache key derived from an article.
pub fn article_index_key(id: ArticleId) -> String {
    format!("article:keys:{}", id)
}
