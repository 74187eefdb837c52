//! SQLite row conversion functions.
//!
//! Pure functions for converting SQLite rows into domain types.

use chrono::{DateTime, Utc};
use rusqlite::Row;

use scribe_core::blog::{Article, User, UserProfile};
use scribe_core::serde::parse_timestamp;

/// Convert a SQLite row to a User.
///
/// Expected columns: id, email, hashed_password, created_at, updated_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        hashed_password: row.get(2)?,
        created_at: parse_datetime(3, &created_at)?,
        updated_at: parse_datetime(4, &updated_at)?,
    })
}

/// Convert a joined article row to an Article with its author.
///
/// Expected columns: id, title, description, content, authorId, createdAt,
/// then the author's id, email, created_at, updated_at (NULL when missing).
pub fn row_to_article(row: &Row) -> rusqlite::Result<Article> {
    let created_at: String = row.get(5)?;

    let author = match row.get::<_, Option<i64>>(6)? {
        Some(id) => {
            let author_created: String = row.get(8)?;
            let author_updated: String = row.get(9)?;
            Some(UserProfile {
                id,
                email: row.get(7)?,
                created_at: parse_datetime(8, &author_created)?,
                updated_at: parse_datetime(9, &author_updated)?,
            })
        }
        None => None,
    };

    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        content: row.get(3)?,
        author_id: row.get(4)?,
        created_at: parse_datetime(5, &created_at)?,
        author,
    })
}

fn parse_datetime(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    parse_timestamp(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}
