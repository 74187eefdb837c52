//! Mocks shared by the decorator tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use scribe_core::blog::{
    apply_article_changes, apply_user_changes, filter_articles, Article, ArticleChanges,
    ArticleFilter, ArticleId, ArticleLookup, NewArticle, NewUser, User, UserChanges, UserId,
    UserLookup,
};
use scribe_core::cache::{Cache, CacheError, Result as CacheResult};
use scribe_core::serde::current_timestamp;
use scribe_core::storage::{ArticleRepository, RepositoryError, Result, UserRepository};

/// Repository that counts every read reaching it.
#[derive(Default)]
pub struct MockRepository {
    users: RwLock<BTreeMap<UserId, User>>,
    articles: RwLock<BTreeMap<ArticleId, Article>>,
    pub user_reads: AtomicUsize,
    pub article_reads: AtomicUsize,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, email: &str) -> User {
        self.create_user(&new_user(email)).await.unwrap()
    }

    pub async fn insert_article(&self, title: &str, author_id: UserId) -> Article {
        self.create_article(&new_article(title, author_id))
            .await
            .unwrap()
    }

    async fn joined(&self, article: &Article) -> Article {
        let users = self.users.read().await;
        Article {
            author: users.get(&article.author_id).map(User::profile),
            ..article.clone()
        }
    }
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        hashed_password: "hash".to_string(),
    }
}

pub fn new_article(title: &str, author_id: UserId) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        description: format!("{title} description"),
        content: format!("{title} content"),
        author_id,
    }
}

fn not_found(entity_type: &'static str, id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type,
        id: id.to_string(),
    }
}

#[async_trait]
impl UserRepository for MockRepository {
    async fn find_users(&self) -> Result<Vec<User>> {
        self.user_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<User>> {
        self.user_reads.fetch_add(1, Ordering::SeqCst);
        let users = self.users.read().await;
        Ok(match lookup {
            UserLookup::Id { id } => users.get(id).cloned(),
            UserLookup::Email { email } => users.values().find(|u| &u.email == email).cloned(),
        })
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        let now = current_timestamp();
        let created = User {
            id: users.keys().next_back().map_or(1, |id| id + 1),
            email: user.email.clone(),
            hashed_password: user.hashed_password.clone(),
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: UserId, changes: &UserChanges) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or_else(|| not_found("User", id))?;
        apply_user_changes(user, changes, current_timestamp());
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("User", id))
    }
}

#[async_trait]
impl ArticleRepository for MockRepository {
    async fn find_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        self.article_reads.fetch_add(1, Ordering::SeqCst);
        let stored: Vec<Article> = self.articles.read().await.values().cloned().collect();
        let mut joined = Vec::with_capacity(stored.len());
        for article in &stored {
            joined.push(self.joined(article).await);
        }
        Ok(filter_articles(joined, filter))
    }

    async fn find_article(&self, lookup: &ArticleLookup) -> Result<Option<Article>> {
        self.article_reads.fetch_add(1, Ordering::SeqCst);
        let stored = self.articles.read().await.get(&lookup.id).cloned();
        match stored {
            Some(article) => Ok(Some(self.joined(&article).await)),
            None => Ok(None),
        }
    }

    async fn create_article(&self, article: &NewArticle) -> Result<Article> {
        let created = {
            let mut articles = self.articles.write().await;
            let created = Article {
                id: articles.keys().next_back().map_or(1, |id| id + 1),
                title: article.title.clone(),
                description: article.description.clone(),
                content: article.content.clone(),
                author_id: article.author_id,
                created_at: current_timestamp(),
                author: None,
            };
            articles.insert(created.id, created.clone());
            created
        };
        Ok(self.joined(&created).await)
    }

    async fn update_article(&self, id: ArticleId, changes: &ArticleChanges) -> Result<()> {
        let mut articles = self.articles.write().await;
        let article = articles.get_mut(&id).ok_or_else(|| not_found("Article", id))?;
        apply_article_changes(article, changes);
        Ok(())
    }

    async fn delete_article(&self, id: ArticleId) -> Result<()> {
        self.articles
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("Article", id))
    }
}

/// Cache whose every operation fails as if the server were down.
pub struct FailingCache;

fn refused<T>() -> CacheResult<T> {
    Err(CacheError::ConnectionFailed("connection refused".to_string()))
}

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        refused()
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
        refused()
    }

    async fn delete(&self, _keys: &[String]) -> CacheResult<()> {
        refused()
    }

    async fn add_to_set(&self, _set_key: &str, _members: &[String]) -> CacheResult<()> {
        refused()
    }

    async fn members_of(&self, _set_key: &str) -> CacheResult<Vec<String>> {
        refused()
    }

    async fn keys_matching(&self, _pattern: &str) -> CacheResult<Vec<String>> {
        refused()
    }

    async fn clear(&self) -> CacheResult<()> {
        refused()
    }

    async fn ping(&self) -> CacheResult<()> {
        refused()
    }
}
