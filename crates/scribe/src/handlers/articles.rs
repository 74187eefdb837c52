//! Article CRUD handlers.
//!
//! Reads are public; writes need a bearer token. Any authenticated user may
//! edit or delete any article. Caching happens in the repository decorator,
//! so the handlers only see `Arc<dyn ArticleRepository>`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use scribe_auth::CurrentUser;
use scribe_core::blog::{
    validate_article_changes, validate_new_article, Article, ArticleChanges, ArticleId,
    ArticleLookup, CreateArticleRequest, ListArticlesQuery,
};
use scribe_core::storage::Paginated;

use crate::{
    handlers::{error::BadRequest, AppError},
    state::AppState,
};

/// List articles (GET /articles).
///
/// Supports `page`, `limit` and exact-match filters on `title`,
/// `description`, `content`, `authorId`, plus a `createdAtStart` /
/// `createdAtEnd` range.
pub async fn list_articles(
    State(state): State<AppState>,
    query: Result<Query<ListArticlesQuery>, QueryRejection>,
) -> Result<Json<Paginated<Article>>, AppError> {
    let Query(query) = query.map_err(BadRequest::from)?;
    let (pagination, filter) = query.into_parts()?;

    let page = state.articles.list_articles(&pagination, &filter).await?;

    tracing::debug!(
        page = page.page,
        limit = page.limit,
        total = page.total,
        "Listed articles"
    );
    Ok(Json(page))
}

/// Get a single article with its author (GET /articles/{id}).
pub async fn get_article(
    State(state): State<AppState>,
    id: Result<Path<ArticleId>, PathRejection>,
) -> Result<Json<Article>, AppError> {
    let Path(id) = id.map_err(BadRequest::from)?;
    let article = state.articles.require_article(&ArticleLookup::id(id)).await?;
    Ok(Json(article))
}

/// Create an article authored by the caller (POST /articles).
///
/// Responds 201 with the stored article, without the author projection.
pub async fn create_article(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    body: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let Json(request) = body.map_err(BadRequest::from)?;
    let new_article = request.into_new_article(user.id);
    validate_new_article(&new_article)?;

    let article = state.articles.create_article(&new_article).await?;

    tracing::info!(article_id = article.id, author_id = user.id, "Article created");
    Ok((StatusCode::CREATED, Json(article.without_author())))
}

/// Update an article (PUT /articles/{id}).
///
/// Responds with the updated article and its author.
pub async fn update_article(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    id: Result<Path<ArticleId>, PathRejection>,
    body: Result<Json<ArticleChanges>, JsonRejection>,
) -> Result<Json<Article>, AppError> {
    let Path(id) = id.map_err(BadRequest::from)?;
    let Json(changes) = body.map_err(BadRequest::from)?;
    validate_article_changes(&changes)?;

    state.articles.update_article(id, &changes).await?;
    let article = state.articles.require_article(&ArticleLookup::id(id)).await?;

    tracing::info!(article_id = id, user_id = user.id, "Article updated");
    Ok(Json(article))
}

/// Delete an article (DELETE /articles/{id}).
pub async fn delete_article(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    id: Result<Path<ArticleId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id.map_err(BadRequest::from)?;
    state.articles.delete_article(id).await?;

    tracing::info!(article_id = id, user_id = user.id, "Article deleted");
    Ok(StatusCode::OK)
}
