mod error;
mod operations;
mod requests;
mod types;

pub use error::ValidationError;
pub use operations::{
    apply_article_changes, apply_user_changes, filter_articles, matches_filter,
    validate_article_changes, validate_email, validate_new_article, validate_user_changes,
};
pub use requests::{
    ArticleChanges, ArticleFilter, ArticleLookup, CreateArticleRequest, ListArticlesQuery,
    NewArticle, NewUser, UpdateProfileRequest, UserChanges, UserLookup,
};
pub use types::{Article, ArticleId, User, UserId, UserProfile};
