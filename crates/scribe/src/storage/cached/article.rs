//! Cached article repository decorator.

use std::sync::Arc;

use async_trait::async_trait;

use scribe_core::blog::{Article, ArticleChanges, ArticleFilter, ArticleId, ArticleLookup, NewArticle};
use scribe_core::cache::{
    user_index_key, ArticleCacheStrategy, Cache, CacheFailurePolicy, CacheStrategy,
};
use scribe_core::storage::{ArticleRepository, Paginated, Pagination, Result};

use super::CacheAccess;

/// Cached article repository decorator.
///
/// Single-article reads are registered under the article's index and under
/// its author's index, since the cached value embeds the author profile.
/// Paginated listings are cached by pagination and filter and dropped in bulk
/// on any article write. `find_articles` is not cached.
pub struct CachedArticleRepository<R, C>
where
    R: ArticleRepository,
    C: Cache,
{
    repository: Arc<R>,
    access: CacheAccess<C>,
    strategy: ArticleCacheStrategy,
}

impl<R, C> CachedArticleRepository<R, C>
where
    R: ArticleRepository,
    C: Cache,
{
    /// Creates a new cached article repository.
    pub fn new(
        repository: Arc<R>,
        cache: Arc<C>,
        strategy: ArticleCacheStrategy,
        policy: CacheFailurePolicy,
    ) -> Self {
        Self {
            repository,
            access: CacheAccess::new(cache, policy),
            strategy,
        }
    }
}

#[async_trait]
impl<R, C> ArticleRepository for CachedArticleRepository<R, C>
where
    R: ArticleRepository + 'static,
    C: Cache + 'static,
{
    async fn find_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        self.repository.find_articles(filter).await
    }

    async fn find_article(&self, lookup: &ArticleLookup) -> Result<Option<Article>> {
        let Some(key) = self.access.check(self.strategy.key_for_one(lookup), "key")? else {
            return self.repository.find_article(lookup).await;
        };

        if let Some(article) = self.access.read::<Article>(&key).await? {
            tracing::trace!(key = %key, "Cache hit for article");
            return Ok(Some(article));
        }

        tracing::trace!(key = %key, "Cache miss for article");
        let article = self.repository.find_article(lookup).await?;

        if let Some(ref a) = article {
            let index = [
                self.strategy.index_key_for(a.id),
                user_index_key(a.author_id),
            ];
            self.access
                .write_tracked(&index, &key, a, self.strategy.ttl())
                .await?;
        }

        Ok(article)
    }

    async fn create_article(&self, article: &NewArticle) -> Result<Article> {
        let created = self.repository.create_article(article).await?;

        self.access
            .invalidated(self.strategy.invalidate_all(self.access.store()).await)?;

        tracing::debug!(article_id = created.id, author_id = created.author_id, "Article created");

        self.require_article(&ArticleLookup::id(created.id)).await
    }

    async fn update_article(&self, id: ArticleId, changes: &ArticleChanges) -> Result<()> {
        self.repository.update_article(id, changes).await?;

        self.access
            .invalidated(self.strategy.invalidate_one(self.access.store(), id).await)?;

        tracing::debug!(article_id = id, "Article updated");
        Ok(())
    }

    async fn delete_article(&self, id: ArticleId) -> Result<()> {
        self.repository.delete_article(id).await?;

        self.access
            .invalidated(self.strategy.invalidate_one(self.access.store(), id).await)?;

        tracing::debug!(article_id = id, "Article deleted");
        Ok(())
    }

    async fn list_articles(
        &self,
        pagination: &Pagination,
        filter: &ArticleFilter,
    ) -> Result<Paginated<Article>> {
        let params = (*pagination, filter.clone());
        let Some(key) = self.access.check(self.strategy.key_for_all(&params), "key")? else {
            return self.repository.list_articles(pagination, filter).await;
        };

        if let Some(page) = self.access.read::<Paginated<Article>>(&key).await? {
            tracing::trace!(key = %key, "Cache hit for article list");
            return Ok(page);
        }

        tracing::trace!(key = %key, "Cache miss for article list");
        let page = self.repository.list_articles(pagination, filter).await?;

        if !page.is_empty() {
            self.access
                .write(&key, &page, self.strategy.ttl())
                .await?;
        }

        Ok(page)
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use scribe_core::blog::{UserChanges, UserLookup};
    use scribe_core::cache::{article_index_key, article_key, article_list_key, UserCacheStrategy};
    use scribe_core::storage::{RepositoryError, UserRepository};

    use crate::cache::MemoryCache;
    use crate::storage::cached::test_support::{new_article, FailingCache, MockRepository};
    use crate::storage::cached::CachedUserRepository;

    type Cached = CachedArticleRepository<MockRepository, MemoryCache>;

    fn cached(repo: &Arc<MockRepository>, cache: &Arc<MemoryCache>) -> Cached {
        CachedArticleRepository::new(
            repo.clone(),
            cache.clone(),
            ArticleCacheStrategy::default(),
            CacheFailurePolicy::Fail,
        )
    }

    async fn seeded() -> (Arc<MockRepository>, Arc<MemoryCache>, Cached, Article) {
        let repo = Arc::new(MockRepository::new());
        let author = repo.insert_user("a@x.com").await;
        let article = repo.insert_article("Hello", author.id).await;
        let cache = Arc::new(MemoryCache::new(100));
        let cached = cached(&repo, &cache);
        (repo, cache, cached, article)
    }

    #[tokio::test]
    async fn test_find_article_reads_through() {
        let (repo, cache, cached, article) = seeded().await;
        let lookup = ArticleLookup::id(article.id);

        let first = cached.find_article(&lookup).await.unwrap();
        let second = cached.find_article(&lookup).await.unwrap();

        assert_eq!(first, Some(article.clone()));
        assert_eq!(second, first);
        assert_eq!(repo.article_reads.load(Ordering::SeqCst), 1);

        let key = article_key(&lookup).unwrap();
        assert_eq!(
            cache.members_of(&article_index_key(article.id)).await.unwrap(),
            vec![key.clone()]
        );
        assert_eq!(
            cache.members_of(&user_index_key(article.author_id)).await.unwrap(),
            vec![key]
        );
    }

    #[tokio::test]
    async fn test_missing_article_is_not_cached() {
        let (repo, cache, cached, _) = seeded().await;

        let result = cached.require_article(&ArticleLookup::id(9999)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        cached.find_article(&ArticleLookup::id(9999)).await.unwrap();

        assert_eq!(repo.article_reads.load(Ordering::SeqCst), 2);
        assert!(cache
            .get(&article_key(&ArticleLookup::id(9999)).unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_reads_through() {
        let (repo, _cache, cached, _) = seeded().await;
        let pagination = Pagination::default();
        let filter = ArticleFilter::default();

        let first = cached.list_articles(&pagination, &filter).await.unwrap();
        let second = cached.list_articles(&pagination, &filter).await.unwrap();

        assert_eq!(first.total, 1);
        assert_eq!(second, first);
        assert_eq!(repo.article_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_list_is_not_cached() {
        let (_repo, cache, cached, _) = seeded().await;
        let pagination = Pagination::default();
        let filter = ArticleFilter::by_author(42);

        let page = cached.list_articles(&pagination, &filter).await.unwrap();

        assert!(page.is_empty());
        assert!(cache
            .get(&article_list_key(&pagination, &filter).unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_invalidates_entries_and_lists() {
        let (_repo, cache, cached, article) = seeded().await;
        let lookup = ArticleLookup::id(article.id);
        let pagination = Pagination::default();
        let filter = ArticleFilter::by_author(article.author_id);

        cached.find_article(&lookup).await.unwrap();
        cached
            .list_articles(&pagination, &ArticleFilter::default())
            .await
            .unwrap();
        cached.list_articles(&pagination, &filter).await.unwrap();
        assert_eq!(cache.keys_matching("articles:*").await.unwrap().len(), 2);

        let changes = ArticleChanges {
            title: Some("Updated".to_string()),
            ..ArticleChanges::default()
        };
        cached.update_article(article.id, &changes).await.unwrap();

        assert!(cache.get(&article_key(&lookup).unwrap()).await.unwrap().is_none());
        assert!(cache
            .members_of(&article_index_key(article.id))
            .await
            .unwrap()
            .is_empty());
        assert!(cache.keys_matching("articles:*").await.unwrap().is_empty());

        let fresh = cached.require_article(&lookup).await.unwrap();
        assert_eq!(fresh.title, "Updated");
    }

    #[tokio::test]
    async fn test_delete_invalidates() {
        let (_repo, cache, cached, article) = seeded().await;
        let lookup = ArticleLookup::id(article.id);
        cached.find_article(&lookup).await.unwrap();
        cached
            .list_articles(&Pagination::default(), &ArticleFilter::default())
            .await
            .unwrap();

        cached.delete_article(article.id).await.unwrap();

        assert!(cached.find_article(&lookup).await.unwrap().is_none());
        assert!(cache.keys_matching("articles:*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_does_not_invalidate() {
        let (_repo, cache, cached, article) = seeded().await;
        cached
            .list_articles(&Pagination::default(), &ArticleFilter::default())
            .await
            .unwrap();

        let result = cached.update_article(article.id + 1, &ArticleChanges::default()).await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        assert_eq!(cache.keys_matching("articles:*").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_invalidates_lists() {
        let (_repo, cache, cached, article) = seeded().await;
        let pagination = Pagination::default();
        let filter = ArticleFilter::default();
        cached.list_articles(&pagination, &filter).await.unwrap();

        let created = cached
            .create_article(&new_article("Second", article.author_id))
            .await
            .unwrap();

        assert_eq!(created.title, "Second");
        assert!(created.author.is_some());
        assert!(cache.keys_matching("articles:*").await.unwrap().is_empty());
        assert_eq!(
            cached.list_articles(&pagination, &filter).await.unwrap().total,
            2
        );
    }

    #[tokio::test]
    async fn test_listings_are_cached_per_filter() {
        let (repo, cache, cached, article) = seeded().await;
        let other = repo.insert_user("b@x.com").await;
        repo.insert_article("Other", other.id).await;
        let pagination = Pagination::default();
        let everything = ArticleFilter::default();
        let by_author = ArticleFilter::by_author(article.author_id);

        let all = cached.list_articles(&pagination, &everything).await.unwrap();
        let mine = cached.list_articles(&pagination, &by_author).await.unwrap();

        assert_eq!(all.total, 2);
        assert_eq!(mine.data, vec![article.clone()]);
        assert_eq!(repo.article_reads.load(Ordering::SeqCst), 2);
        for filter in [&everything, &by_author] {
            let key = article_list_key(&pagination, filter).unwrap();
            assert!(cache.get(&key).await.unwrap().is_some());
        }

        assert_eq!(cached.list_articles(&pagination, &everything).await.unwrap(), all);
        assert_eq!(cached.list_articles(&pagination, &by_author).await.unwrap(), mine);
        assert_eq!(repo.article_reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_author_email_change_drops_cached_articles() {
        let (repo, cache, cached, article) = seeded().await;
        let lookup = ArticleLookup::id(article.id);
        let users = CachedUserRepository::new(
            repo.clone(),
            cache.clone(),
            UserCacheStrategy::default(),
            ArticleCacheStrategy::default(),
            CacheFailurePolicy::Fail,
        );

        cached.find_article(&lookup).await.unwrap();
        cached
            .list_articles(&Pagination::default(), &ArticleFilter::default())
            .await
            .unwrap();

        let changes = UserChanges {
            email: Some("new@x.com".to_string()),
            hashed_password: None,
        };
        users.update_user(article.author_id, &changes).await.unwrap();

        let fresh = cached.require_article(&lookup).await.unwrap();
        assert_eq!(fresh.author.unwrap().email, "new@x.com");
        let page = cached
            .list_articles(&Pagination::default(), &ArticleFilter::default())
            .await
            .unwrap();
        assert_eq!(page.data[0].author.as_ref().unwrap().email, "new@x.com");
        assert!(users
            .find_user(&UserLookup::id(article.author_id))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_ttl_expiry_refetches() {
        let (repo, cache, _, article) = seeded().await;
        let cached = CachedArticleRepository::new(
            repo.clone(),
            cache,
            ArticleCacheStrategy::new(Duration::from_millis(50)),
            CacheFailurePolicy::Fail,
        );
        let lookup = ArticleLookup::id(article.id);

        cached.find_article(&lookup).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        cached.find_article(&lookup).await.unwrap();

        assert_eq!(repo.article_reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_bypass_serves_from_repository() {
        let repo = Arc::new(MockRepository::new());
        let author = repo.insert_user("a@x.com").await;
        let article = repo.insert_article("Hello", author.id).await;
        let cached = CachedArticleRepository::new(
            repo.clone(),
            Arc::new(FailingCache),
            ArticleCacheStrategy::default(),
            CacheFailurePolicy::Bypass,
        );

        let page = cached
            .list_articles(&Pagination::default(), &ArticleFilter::default())
            .await
            .unwrap();
        assert_eq!(page.data, vec![article.clone()]);

        cached.delete_article(article.id).await.unwrap();
        assert!(cached
            .find_article(&ArticleLookup::id(article.id))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_fail_policy_surfaces_cache_errors() {
        let repo = Arc::new(MockRepository::new());
        let cached = CachedArticleRepository::new(
            repo,
            Arc::new(FailingCache),
            ArticleCacheStrategy::default(),
            CacheFailurePolicy::Fail,
        );

        let result = cached
            .list_articles(&Pagination::default(), &ArticleFilter::default())
            .await;

        assert!(matches!(result, Err(RepositoryError::CacheUnavailable(_))));
    }
}
