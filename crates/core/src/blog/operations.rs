use chrono::{DateTime, Utc};

use super::error::ValidationError;
use super::requests::{ArticleChanges, ArticleFilter, NewArticle, UserChanges};
use super::types::{Article, User};

/// Returns true if the article satisfies every criterion set on the filter.
pub fn matches_filter(article: &Article, filter: &ArticleFilter) -> bool {
    filter.title.as_ref().is_none_or(|t| &article.title == t)
        && filter
            .description
            .as_ref()
            .is_none_or(|d| &article.description == d)
        && filter.content.as_ref().is_none_or(|c| &article.content == c)
        && filter.author_id.is_none_or(|id| article.author_id == id)
        && filter
            .created_at_range()
            .is_none_or(|(start, end)| article.created_at >= start && article.created_at <= end)
}

/// Keeps the articles matching the filter, ordered by id.
pub fn filter_articles(articles: Vec<Article>, filter: &ArticleFilter) -> Vec<Article> {
    let mut matched: Vec<Article> = articles
        .into_iter()
        .filter(|article| matches_filter(article, filter))
        .collect();
    matched.sort_by_key(|article| article.id);
    matched
}

/// Minimal shape check: one `@` with text on both sides and a dot in the domain.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !domain.contains('@')
        })
        && !email.chars().any(char::is_whitespace);

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Validates a new article before it is persisted.
pub fn validate_new_article(article: &NewArticle) -> Result<(), ValidationError> {
    require_text("title", &article.title)?;
    require_text("description", &article.description)?;
    require_text("content", &article.content)
}

/// Validates a partial article update.
pub fn validate_article_changes(changes: &ArticleChanges) -> Result<(), ValidationError> {
    if changes.is_empty() {
        return Err(ValidationError::NoChanges);
    }
    if let Some(title) = &changes.title {
        require_text("title", title)?;
    }
    if let Some(description) = &changes.description {
        require_text("description", description)?;
    }
    if let Some(content) = &changes.content {
        require_text("content", content)?;
    }
    Ok(())
}

/// Validates a partial user update.
pub fn validate_user_changes(changes: &UserChanges) -> Result<(), ValidationError> {
    if changes.is_empty() {
        return Err(ValidationError::NoChanges);
    }
    if let Some(email) = &changes.email {
        validate_email(email)?;
    }
    Ok(())
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// Applies the set fields of `changes` to `article`.
pub fn apply_article_changes(article: &mut Article, changes: &ArticleChanges) {
    if let Some(title) = &changes.title {
        article.title = title.clone();
    }
    if let Some(description) = &changes.description {
        article.description = description.clone();
    }
    if let Some(content) = &changes.content {
        article.content = content.clone();
    }
}

/// Applies the set fields of `changes` to `user` and bumps `updated_at`.
pub fn apply_user_changes(user: &mut User, changes: &UserChanges, now: DateTime<Utc>) {
    if let Some(email) = &changes.email {
        user.email = email.clone();
    }
    if let Some(hashed_password) = &changes.hashed_password {
        user.hashed_password = hashed_password.clone();
    }
    user.updated_at = now;
}
