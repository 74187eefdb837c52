//! Request and lookup types for user and article operations.
//!
//! Lookups and filters double as cache-key material: their serialized form
//! is embedded in keys, so field order is part of the contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::serde::{deserialize_optional_string, optional_timestamp};
use crate::storage::{Pagination, PaginationError, DEFAULT_LIMIT, DEFAULT_PAGE};

use super::types::{ArticleId, UserId};

/// Criteria for fetching a single user.
///
/// Serializes to `{"id":1}` or `{"email":"a@x.com"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UserLookup {
    Id { id: UserId },
    Email { email: String },
}

impl UserLookup {
    pub fn id(id: UserId) -> Self {
        UserLookup::Id { id }
    }

    pub fn email(email: impl Into<String>) -> Self {
        UserLookup::Email {
            email: email.into(),
        }
    }

    /// Identifier used in `NotFound` errors.
    pub fn describe(&self) -> String {
        match self {
            UserLookup::Id { id } => id.to_string(),
            UserLookup::Email { email } => email.clone(),
        }
    }
}

/// Criteria for fetching a single article. Serializes to `{"id":1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArticleLookup {
    pub id: ArticleId,
}

impl ArticleLookup {
    pub fn id(id: ArticleId) -> Self {
        Self { id }
    }
}

/// Data needed to persist a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
}

/// Partial update of a stored user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub hashed_password: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.hashed_password.is_none()
    }
}

/// Body of `PUT /users/me`. The password arrives in plain text and is
/// hashed before it becomes a [`UserChanges`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub password: Option<String>,
}

/// Data needed to persist a new article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub description: String,
    pub content: String,
    pub author_id: UserId,
}

/// Body of `POST /articles`. The author comes from the authenticated user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub description: String,
    pub content: String,
}

impl CreateArticleRequest {
    pub fn into_new_article(self, author_id: UserId) -> NewArticle {
        NewArticle {
            title: self.title,
            description: self.description,
            content: self.content,
            author_id,
        }
    }
}

/// Partial update of a stored article; also the body of `PUT /articles/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArticleChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ArticleChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.content.is_none()
    }
}

/// Exact-match filter for article listings.
///
/// Absent fields are skipped when serialized, so `{}` is the unfiltered key
/// component. The created-at range only applies when both bounds are set
/// and `start <= end`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,
    #[serde(
        default,
        with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at_start: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at_end: Option<DateTime<Utc>>,
}

impl ArticleFilter {
    /// Restricts the listing to one author.
    pub fn by_author(author_id: UserId) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    /// Returns the created-at bounds when both are present and ordered.
    pub fn created_at_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.created_at_start, self.created_at_end) {
            (Some(start), Some(end)) if start <= end => Some((start, end)),
            _ => None,
        }
    }
}

/// Query string of `GET /articles`.
///
/// Kept flat because nested or flattened structs lose numeric parsing in
/// `serde_urlencoded`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListArticlesQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub content: Option<String>,
    #[serde(default)]
    pub author_id: Option<UserId>,
    #[serde(default, with = "optional_timestamp")]
    pub created_at_start: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_timestamp")]
    pub created_at_end: Option<DateTime<Utc>>,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl ListArticlesQuery {
    /// Splits the query into validated pagination and a filter.
    pub fn into_parts(self) -> Result<(Pagination, ArticleFilter), PaginationError> {
        let pagination = Pagination::new(self.page, self.limit)?;
        let filter = ArticleFilter {
            title: self.title,
            description: self.description,
            content: self.content,
            author_id: self.author_id,
            created_at_start: self.created_at_start,
            created_at_end: self.created_at_end,
        };
        Ok((pagination, filter))
    }
}
