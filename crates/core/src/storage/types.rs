use serde::{Deserialize, Serialize};

use super::PaginationError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// One-based page selection for list queries.
///
/// Field order is fixed (`page`, then `limit`) so the serialized form can be
/// used as part of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Creates pagination parameters, validating that both values are >= 1.
    pub fn new(page: u32, limit: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        if limit == 0 {
            return Err(PaginationError::InvalidLimit);
        }
        Ok(Self { page, limit })
    }

    /// Number of items skipped before this page starts.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// A single page of results together with the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    /// Returns true when the underlying query matched nothing at all.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Slices `items` down to the requested page.
///
/// Pages past the end yield an empty `data` while `total` still reports
/// the full match count.
pub fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Paginated<T> {
    let total = items.len();
    let data = items
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.limit as usize)
        .collect();

    Paginated {
        page: pagination.page,
        limit: pagination.limit,
        total,
        data,
    }
}
