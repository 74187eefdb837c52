//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use scribe_core::blog::{
    apply_article_changes, apply_user_changes, filter_articles, Article, ArticleChanges,
    ArticleFilter, ArticleId, ArticleLookup, NewArticle, NewUser, User, UserChanges, UserId,
    UserLookup,
};
use scribe_core::serde::current_timestamp;
use scribe_core::storage::{ArticleRepository, RepositoryError, Result, UserRepository};

/// In-memory storage backend.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
/// Articles are stored without their author and joined on read.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    articles: Arc<RwLock<HashMap<ArticleId, Article>>>,
    next_user_id: Arc<AtomicI64>,
    next_article_id: Arc<AtomicI64>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            articles: Arc::new(RwLock::new(HashMap::new())),
            next_user_id: Arc::new(AtomicI64::new(1)),
            next_article_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

fn user_not_found(id: UserId) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: "User",
        id: id.to_string(),
    }
}

fn article_not_found(id: ArticleId) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: "Article",
        id: id.to_string(),
    }
}

fn email_taken(users: &HashMap<UserId, User>, email: &str, except: Option<UserId>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

fn with_author(article: &Article, users: &HashMap<UserId, User>) -> Article {
    Article {
        author: users.get(&article.author_id).map(User::profile),
        ..article.clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_users(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.id);
        Ok(all)
    }

    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(match lookup {
            UserLookup::Id { id } => users.get(id).cloned(),
            UserLookup::Email { email } => users.values().find(|u| &u.email == email).cloned(),
        })
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.email.clone(),
            });
        }

        let now = current_timestamp();
        let created = User {
            id: self.next_user_id.fetch_add(1, Ordering::SeqCst),
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
        if let Some(email) = &changes.email {
            if email_taken(&users, email, Some(id)) {
                return Err(RepositoryError::AlreadyExists {
                    entity_type: "User",
                    id: email.clone(),
                });
            }
        }

        let user = users.get_mut(&id).ok_or_else(|| user_not_found(id))?;
        apply_user_changes(user, changes, current_timestamp());
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        // Lock order: users before articles, same as the article writes
        let mut users = self.users.write().await;
        if !users.contains_key(&id) {
            return Err(user_not_found(id));
        }

        let articles = self.articles.read().await;
        if articles.values().any(|a| a.author_id == id) {
            return Err(RepositoryError::InvalidData(format!(
                "User {id} still owns articles"
            )));
        }

        users.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ArticleRepository for InMemoryRepository {
    async fn find_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let users = self.users.read().await;
        let articles = self.articles.read().await;
        let joined = articles
            .values()
            .map(|article| with_author(article, &users))
            .collect();
        Ok(filter_articles(joined, filter))
    }

    async fn find_article(&self, lookup: &ArticleLookup) -> Result<Option<Article>> {
        let users = self.users.read().await;
        let articles = self.articles.read().await;
        Ok(articles
            .get(&lookup.id)
            .map(|article| with_author(article, &users)))
    }

    async fn create_article(&self, article: &NewArticle) -> Result<Article> {
        let users = self.users.read().await;
        let Some(author) = users.get(&article.author_id) else {
            return Err(RepositoryError::InvalidData(format!(
                "Author {} does not exist",
                article.author_id
            )));
        };

        let created = Article {
            id: self.next_article_id.fetch_add(1, Ordering::SeqCst),
            title: article.title.clone(),
            description: article.description.clone(),
            content: article.content.clone(),
            author_id: article.author_id,
            created_at: current_timestamp(),
            author: None,
        };

        let mut articles = self.articles.write().await;
        articles.insert(created.id, created.clone());

        Ok(Article {
            author: Some(author.profile()),
            ..created
        })
    }

    async fn update_article(&self, id: ArticleId, changes: &ArticleChanges) -> Result<()> {
        let mut articles = self.articles.write().await;
        let article = articles.get_mut(&id).ok_or_else(|| article_not_found(id))?;
        apply_article_changes(article, changes);
        Ok(())
    }

    async fn delete_article(&self, id: ArticleId) -> Result<()> {
        let mut articles = self.articles.write().await;
        if articles.remove(&id).is_none() {
            return Err(article_not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::storage::Pagination;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            hashed_password: "hash".to_string(),
        }
    }

    fn new_article(title: &str, author_id: UserId) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            description: format!("{title} description"),
            content: format!("{title} content"),
            author_id,
        }
    }

    // ==================== User Tests ====================

    #[tokio::test]
    async fn test_user_create_and_find() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user(&new_user("a@x.com")).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(
            repo.find_user(&UserLookup::id(user.id)).await.unwrap(),
            Some(user.clone())
        );
        assert_eq!(
            repo.find_user(&UserLookup::email("a@x.com")).await.unwrap(),
            Some(user)
        );
    }

    #[tokio::test]
    async fn test_user_ids_are_sequential() {
        let repo = InMemoryRepository::new();
        let first = repo.create_user(&new_user("a@x.com")).await.unwrap();
        let second = repo.create_user(&new_user("b@x.com")).await.unwrap();

        assert_eq!(second.id, first.id + 1);
        let all = repo.find_users().await.unwrap();
        assert_eq!(all.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_user_duplicate_email() {
        let repo = InMemoryRepository::new();
        repo.create_user(&new_user("a@x.com")).await.unwrap();

        let result = repo.create_user(&new_user("a@x.com")).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_user_find_missing_is_none() {
        let repo = InMemoryRepository::new();
        assert!(repo
            .find_user(&UserLookup::id(42))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_user_update() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user(&new_user("a@x.com")).await.unwrap();
        let changes = UserChanges {
            email: Some("b@x.com".to_string()),
            hashed_password: None,
        };

        repo.update_user(user.id, &changes).await.unwrap();

        let updated = repo.require_user(&UserLookup::id(user.id)).await.unwrap();
        assert_eq!(updated.email, "b@x.com");
        assert_eq!(updated.hashed_password, "hash");
        assert!(updated.updated_at >= user.updated_at);
    }

    #[tokio::test]
    async fn test_user_update_to_taken_email() {
        let repo = InMemoryRepository::new();
        repo.create_user(&new_user("a@x.com")).await.unwrap();
        let other = repo.create_user(&new_user("b@x.com")).await.unwrap();
        let changes = UserChanges {
            email: Some("a@x.com".to_string()),
            hashed_password: None,
        };

        let result = repo.update_user(other.id, &changes).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_user_update_missing() {
        let repo = InMemoryRepository::new();
        let result = repo.update_user(9, &UserChanges::default()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_user_delete() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user(&new_user("a@x.com")).await.unwrap();

        repo.delete_user(user.id).await.unwrap();

        assert!(repo
            .find_user(&UserLookup::id(user.id))
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            repo.delete_user(user.id).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_user_delete_with_articles_is_restricted() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user(&new_user("a@x.com")).await.unwrap();
        repo.create_article(&new_article("Hello", user.id))
            .await
            .unwrap();

        let result = repo.delete_user(user.id).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
        assert!(repo
            .find_user(&UserLookup::id(user.id))
            .await
            .unwrap()
            .is_some());
    }

    // ==================== Article Tests ====================

    #[tokio::test]
    async fn test_article_create_joins_author() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user(&new_user("a@x.com")).await.unwrap();

        let article = repo
            .create_article(&new_article("Hello", user.id))
            .await
            .unwrap();
        assert_eq!(article.id, 1);
        assert_eq!(article.author, Some(user.profile()));

        let found = repo
            .require_article(&ArticleLookup::id(article.id))
            .await
            .unwrap();
        assert_eq!(found, article);
    }

    #[tokio::test]
    async fn test_article_create_unknown_author() {
        let repo = InMemoryRepository::new();
        let result = repo.create_article(&new_article("Hello", 7)).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_article_join_reflects_author_changes() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user(&new_user("a@x.com")).await.unwrap();
        let article = repo
            .create_article(&new_article("Hello", user.id))
            .await
            .unwrap();

        let changes = UserChanges {
            email: Some("new@x.com".to_string()),
            hashed_password: None,
        };
        repo.update_user(user.id, &changes).await.unwrap();

        let found = repo
            .require_article(&ArticleLookup::id(article.id))
            .await
            .unwrap();
        assert_eq!(found.author.unwrap().email, "new@x.com");
    }

    #[tokio::test]
    async fn test_article_filter_and_list() {
        let repo = InMemoryRepository::new();
        let alice = repo.create_user(&new_user("a@x.com")).await.unwrap();
        let bob = repo.create_user(&new_user("b@x.com")).await.unwrap();
        for title in ["one", "two", "three"] {
            repo.create_article(&new_article(title, alice.id))
                .await
                .unwrap();
        }
        repo.create_article(&new_article("four", bob.id))
            .await
            .unwrap();

        let by_alice = repo
            .find_articles(&ArticleFilter::by_author(alice.id))
            .await
            .unwrap();
        assert_eq!(by_alice.len(), 3);

        let page = repo
            .list_articles(&Pagination::new(2, 2).unwrap(), &ArticleFilter::default())
            .await
            .unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].title, "three");
        assert_eq!(page.data[1].title, "four");
    }

    #[tokio::test]
    async fn test_article_update_and_delete() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user(&new_user("a@x.com")).await.unwrap();
        let article = repo
            .create_article(&new_article("Hello", user.id))
            .await
            .unwrap();

        let changes = ArticleChanges {
            title: Some("Updated".to_string()),
            ..ArticleChanges::default()
        };
        repo.update_article(article.id, &changes).await.unwrap();
        let updated = repo
            .require_article(&ArticleLookup::id(article.id))
            .await
            .unwrap();
        assert_eq!(updated.title, "Updated");
        assert_eq!(updated.content, article.content);

        repo.delete_article(article.id).await.unwrap();
        assert!(matches!(
            repo.require_article(&ArticleLookup::id(article.id)).await,
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete_article(article.id).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
