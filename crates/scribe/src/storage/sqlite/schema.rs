//! SQLite schema definitions and SQL query constants.
//!
//! Pure data and query builders, no I/O. Timestamps are stored as fixed-width
//! `YYYY-MM-DDTHH:MM:SS.mmmZ` text so they compare correctly as strings.

use rusqlite::types::Value;

use scribe_core::blog::ArticleFilter;
use scribe_core::serde::format_timestamp;

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    hashed_password TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    content TEXT NOT NULL,
    authorId INTEGER NOT NULL,
    createdAt TEXT NOT NULL,
    FOREIGN KEY (authorId) REFERENCES users(id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_articles_author_id ON articles(authorId);
CREATE INDEX IF NOT EXISTS idx_articles_created_at ON articles(createdAt);
"#;

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (email, hashed_password, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4)
"#;

pub const SELECT_USERS: &str = r#"
SELECT id, email, hashed_password, created_at, updated_at
FROM users
ORDER BY id ASC
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, email, hashed_password, created_at, updated_at
FROM users
WHERE id = ?1
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, email, hashed_password, created_at, updated_at
FROM users
WHERE email = ?1
"#;

pub const UPDATE_USER: &str = r#"
UPDATE users
SET email = COALESCE(?2, email),
    hashed_password = COALESCE(?3, hashed_password),
    updated_at = ?4
WHERE id = ?1
"#;

pub const DELETE_USER: &str = r#"
DELETE FROM users
WHERE id = ?1
"#;

// Article queries
pub const INSERT_ARTICLE: &str = r#"
INSERT INTO articles (title, description, content, authorId, createdAt)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

/// Article columns joined with the author's public projection.
const SELECT_ARTICLES_WITH_AUTHOR: &str = r#"
SELECT a.id, a.title, a.description, a.content, a.authorId, a.createdAt,
       u.id, u.email, u.created_at, u.updated_at
FROM articles a
LEFT JOIN users u ON u.id = a.authorId
"#;

pub const UPDATE_ARTICLE: &str = r#"
UPDATE articles
SET title = COALESCE(?2, title),
    description = COALESCE(?3, description),
    content = COALESCE(?4, content)
WHERE id = ?1
"#;

pub const DELETE_ARTICLE: &str = r#"
DELETE FROM articles
WHERE id = ?1
"#;

/// Query selecting one article by id, with its author.
pub fn select_article_by_id() -> String {
    format!("{SELECT_ARTICLES_WITH_AUTHOR}WHERE a.id = ?1")
}

/// Builds the article listing query for a filter.
///
/// Returns the SQL and its positional parameters. The created-at range only
/// applies when both bounds are present and ordered.
pub fn select_articles(filter: &ArticleFilter) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    let mut push = |clause: &str, value: Value| {
        params.push(value);
        clauses.push(format!("{clause} ?{}", params.len()));
    };

    if let Some(title) = &filter.title {
        push("a.title =", Value::Text(title.clone()));
    }
    if let Some(description) = &filter.description {
        push("a.description =", Value::Text(description.clone()));
    }
    if let Some(content) = &filter.content {
        push("a.content =", Value::Text(content.clone()));
    }
    if let Some(author_id) = filter.author_id {
        push("a.authorId =", Value::Integer(author_id));
    }
    if let Some((start, end)) = filter.created_at_range() {
        push("a.createdAt >=", Value::Text(format_timestamp(&start)));
        push("a.createdAt <=", Value::Text(format_timestamp(&end)));
    }

    let mut sql = SELECT_ARTICLES_WITH_AUTHOR.to_string();
    if !clauses.is_empty() {
        sql.push_str("WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str("\nORDER BY a.id ASC");

    (sql, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_create_tables_enforces_foreign_keys() {
        assert!(CREATE_TABLES.contains("PRAGMA foreign_keys = ON"));
        assert!(CREATE_TABLES.contains("ON DELETE RESTRICT"));
        assert!(CREATE_TABLES.contains("email TEXT NOT NULL UNIQUE"));
    }

    #[test]
    fn test_select_articles_without_filter() {
        let (sql, params) = select_articles(&ArticleFilter::default());

        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with("ORDER BY a.id ASC"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_articles_numbers_params_in_order() {
        let filter = ArticleFilter {
            title: Some("Hello".to_string()),
            author_id: Some(3),
            ..ArticleFilter::default()
        };

        let (sql, params) = select_articles(&filter);

        assert!(sql.contains("WHERE a.title = ?1 AND a.authorId = ?2"));
        assert_eq!(
            params,
            vec![Value::Text("Hello".to_string()), Value::Integer(3)]
        );
    }

    #[test]
    fn test_select_articles_half_open_range_is_ignored() {
        let filter = ArticleFilter {
            created_at_start: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..ArticleFilter::default()
        };

        let (sql, params) = select_articles(&filter);

        assert!(!sql.contains("createdAt >="));
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_articles_range() {
        let filter = ArticleFilter {
            created_at_start: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            created_at_end: Some(Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()),
            ..ArticleFilter::default()
        };

        let (sql, params) = select_articles(&filter);

        assert!(sql.contains("a.createdAt >= ?1 AND a.createdAt <= ?2"));
        assert_eq!(
            params[0],
            Value::Text("2024-01-01T00:00:00.000Z".to_string())
        );
    }
}
