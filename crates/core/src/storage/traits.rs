use async_trait::async_trait;

use crate::blog::{
    Article, ArticleChanges, ArticleFilter, ArticleId, ArticleLookup, NewArticle, NewUser, User,
    UserChanges, UserId, UserLookup,
};

use super::{paginate, Paginated, Pagination, RepositoryError, Result};

/// Repository for user operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets every user, ordered by id.
    async fn find_users(&self) -> Result<Vec<User>>;

    /// Gets a single user by id or email.
    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<User>>;

    /// Persists a new user and returns it with its generated id.
    ///
    /// Fails with `AlreadyExists` when the email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    /// Updates an existing user.
    async fn update_user(&self, id: UserId, changes: &UserChanges) -> Result<()>;

    /// Deletes a user by its ID. Users that still own articles are rejected.
    async fn delete_user(&self, id: UserId) -> Result<()>;

    /// Gets a single user, failing with `NotFound` when absent.
    async fn require_user(&self, lookup: &UserLookup) -> Result<User> {
        self.find_user(lookup)
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "User",
                id: lookup.describe(),
            })
    }
}

/// Repository for article operations.
///
/// Reads join the author into [`Article::author`].
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Gets every article matching the filter, ordered by id.
    async fn find_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>>;

    /// Gets a single article by id.
    async fn find_article(&self, lookup: &ArticleLookup) -> Result<Option<Article>>;

    /// Persists a new article and returns it with its generated id.
    ///
    /// Fails with `InvalidData` when the author does not exist.
    async fn create_article(&self, article: &NewArticle) -> Result<Article>;

    /// Updates an existing article.
    async fn update_article(&self, id: ArticleId, changes: &ArticleChanges) -> Result<()>;

    /// Deletes an article by its ID.
    async fn delete_article(&self, id: ArticleId) -> Result<()>;

    /// Gets one page of the articles matching the filter.
    async fn list_articles(
        &self,
        pagination: &Pagination,
        filter: &ArticleFilter,
    ) -> Result<Paginated<Article>> {
        let articles = self.find_articles(filter).await?;
        Ok(paginate(articles, *pagination))
    }

    /// Gets a single article, failing with `NotFound` when absent.
    async fn require_article(&self, lookup: &ArticleLookup) -> Result<Article> {
        self.find_article(lookup)
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "Article",
                id: lookup.id.to_string(),
            })
    }
}
