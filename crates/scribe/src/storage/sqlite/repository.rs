//! SQLite repository implementation.
//!
//! Implements the repository traits from `scribe_core::storage` using SQLite.

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use scribe_core::blog::{
    Article, ArticleChanges, ArticleFilter, ArticleId, ArticleLookup, NewArticle, NewUser, User,
    UserChanges, UserId, UserLookup,
};
use scribe_core::serde::{current_timestamp, format_timestamp};
use scribe_core::storage::{ArticleRepository, RepositoryError, Result, UserRepository};

use super::conversions::{row_to_article, row_to_user};
use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Turns "no row touched" into `QueryReturnedNoRows` so it maps to `NotFound`.
fn require_affected(rows: usize) -> std::result::Result<(), tokio_rusqlite::Error> {
    if rows == 0 {
        Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
    } else {
        Ok(())
    }
}

fn query_article(
    conn: &rusqlite::Connection,
    id: ArticleId,
) -> std::result::Result<Option<Article>, tokio_rusqlite::Error> {
    let mut stmt = conn
        .prepare(&schema::select_article_by_id())
        .map_err(wrap_err)?;
    match stmt.query_row([id], row_to_article) {
        Ok(article) => Ok(Some(article)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(wrap_err(e)),
    }
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for users and articles.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn find_users(&self) -> Result<Vec<User>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_USERS).map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_user).map_err(wrap_err)?;

                let mut users = Vec::new();
                for row_result in rows {
                    users.push(row_result.map_err(wrap_err)?);
                }
                Ok(users)
            })
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<User>> {
        let lookup = lookup.clone();
        let described = lookup.describe();

        self.conn
            .call(move |conn| {
                let result = match &lookup {
                    UserLookup::Id { id } => conn
                        .prepare(schema::SELECT_USER_BY_ID)
                        .and_then(|mut stmt| stmt.query_row([id], row_to_user)),
                    UserLookup::Email { email } => conn
                        .prepare(schema::SELECT_USER_BY_EMAIL)
                        .and_then(|mut stmt| stmt.query_row([email], row_to_user)),
                };
                match result {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", described))
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let now = current_timestamp();
        let mut created = User {
            id: 0,
            email: user.email.clone(),
            hashed_password: user.hashed_password.clone(),
            created_at: now,
            updated_at: now,
        };
        let email = created.email.clone();
        let hashed_password = created.hashed_password.clone();
        let timestamp = format_timestamp(&now);

        created.id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_USER,
                    rusqlite::params![email, hashed_password, timestamp, timestamp],
                )
                .map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", user.email.clone()))?;

        Ok(created)
    }

    async fn update_user(&self, id: UserId, changes: &UserChanges) -> Result<()> {
        let email = changes.email.clone();
        let hashed_password = changes.hashed_password.clone();
        let updated_at = format_timestamp(&current_timestamp());
        let target = changes.email.clone().unwrap_or_else(|| id.to_string());

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_USER,
                        rusqlite::params![id, email, hashed_password, updated_at],
                    )
                    .map_err(wrap_err)?;
                require_affected(rows)
            })
            .await
            .map_err(|e| match map_tokio_rusqlite_error(e, "User", target) {
                // NotFound must name the id even when an email was supplied
                RepositoryError::NotFound { entity_type, .. } => RepositoryError::NotFound {
                    entity_type,
                    id: id.to_string(),
                },
                other => other,
            })
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        self.conn
            .call(move |conn| {
                let rows = conn.execute(schema::DELETE_USER, [id]).map_err(wrap_err)?;
                require_affected(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", id.to_string()))
    }
}

// ============================================================================
// ArticleRepository implementation
// ============================================================================

#[async_trait]
impl ArticleRepository for SqliteRepository {
    async fn find_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let (sql, params) = schema::select_articles(filter);

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(rusqlite::params_from_iter(params), row_to_article)
                    .map_err(wrap_err)?;

                let mut articles = Vec::new();
                for row_result in rows {
                    articles.push(row_result.map_err(wrap_err)?);
                }
                Ok(articles)
            })
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn find_article(&self, lookup: &ArticleLookup) -> Result<Option<Article>> {
        let id = lookup.id;

        self.conn
            .call(move |conn| query_article(conn, id))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Article", id.to_string()))
    }

    async fn create_article(&self, article: &NewArticle) -> Result<Article> {
        let title = article.title.clone();
        let description = article.description.clone();
        let content = article.content.clone();
        let author_id = article.author_id;
        let created_at = format_timestamp(&current_timestamp());

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_ARTICLE,
                    rusqlite::params![title, description, content, author_id, created_at],
                )
                .map_err(wrap_err)?;
                let id = conn.last_insert_rowid();
                query_article(conn, id)?
                    .ok_or_else(|| wrap_err(rusqlite::Error::QueryReturnedNoRows))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Article", format!("by author {author_id}")))
    }

    async fn update_article(&self, id: ArticleId, changes: &ArticleChanges) -> Result<()> {
        let title = changes.title.clone();
        let description = changes.description.clone();
        let content = changes.content.clone();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_ARTICLE,
                        rusqlite::params![id, title, description, content],
                    )
                    .map_err(wrap_err)?;
                require_affected(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Article", id.to_string()))
    }

    async fn delete_article(&self, id: ArticleId) -> Result<()> {
        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_ARTICLE, [id])
                    .map_err(wrap_err)?;
                require_affected(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Article", id.to_string()))
    }
}
