mod error;
mod http_mapping;
mod traits;
mod types;

pub use error::{PaginationError, RepositoryError, Result};
pub use http_mapping::{repository_error_to_status_code, ErrorBody};
pub use traits::{ArticleRepository, UserRepository};
pub use types::{paginate, Paginated, Pagination, DEFAULT_LIMIT, DEFAULT_PAGE};
