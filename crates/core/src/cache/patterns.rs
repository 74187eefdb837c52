//! Pure pattern matching functions for cache keys.
//!
//! These functions support glob-style patterns with `*` wildcard
//! that matches any sequence of characters, mirroring Redis `SCAN MATCH`
//! for the subset of syntax the cache keys need.

/// Checks if a cache key matches a glob pattern.
///
/// The pattern supports `*` as a wildcard that matches any sequence
/// of characters (including empty strings). Every other character is
/// literal, including `?`, `[` and `]`, which appear in JSON key material.
///
/// # Examples
///
/// ```
/// use scribe_core::cache::pattern_matches;
///
/// // Exact match
/// assert!(pattern_matches("users", "users"));
///
/// // Wildcard at end
/// assert!(pattern_matches("articles:*", r#"articles:{"page":1,"limit":10}:{}"#));
///
/// // No match
/// assert!(!pattern_matches("articles:*", r#"article:{"id":1}"#));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let mut segments = pattern.split('*');

    let head = segments.next().unwrap_or_default();
    let Some(mut rest) = key.strip_prefix(head) else {
        return false;
    };

    let tail: Vec<&str> = segments.collect();
    let Some((last, middle)) = tail.split_last() else {
        // No wildcard at all
        return rest.is_empty();
    };

    for segment in middle {
        match rest.find(segment) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}
