//! Page-number pagination with the `{items, currentPage, lastPage}` wire
//! shape used by every paginated listing.

use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Query parameters selecting a page.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number.
    #[serde(rename = "currentPage")]
    pub current_page: Option<i64>,
    /// Page size override.
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Selected page, clamped to at least 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.current_page.unwrap_or(1).max(1)
    }

    /// Page size, clamped to at least 1.
    #[must_use]
    pub fn page_size(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    /// Row offset of the selected page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.page_size()
    }
}

/// A page of items.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    #[serde(rename = "lastPage")]
    pub last_page: i64,
}

impl<T> Paginated<T> {
    /// Wrap one page of `items` given the total row count across all pages.
    #[must_use]
    pub fn new(items: Vec<T>, page: &PageQuery, total: i64) -> Self {
        Self {
            items,
            current_page: page.page(),
            last_page: last_page(total, page.page_size()),
        }
    }
}

/// Number of the last page: ceil(total / `page_size`), at least 1 so an
/// empty listing still reports page 1 of 1.
#[must_use]
pub fn last_page(total: i64, page_size: i64) -> i64 {
    let size = page_size.max(1);
    ((total + size - 1) / size).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_rounds_up() {
        assert_eq!(last_page(0, 20), 1);
        assert_eq!(last_page(1, 20), 1);
        assert_eq!(last_page(20, 20), 1);
        assert_eq!(last_page(21, 20), 2);
        assert_eq!(last_page(41, 20), 3);
        assert_eq!(last_page(7, 1), 7);
        assert_eq!(last_page(5, 0), 5);
    }

    #[test]
    fn test_page_query_defaults() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_page_query_offset() {
        let q = PageQuery {
            current_page: Some(3),
            limit: Some(10),
        };
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn test_page_query_clamps_nonsense() {
        let q = PageQuery {
            current_page: Some(0),
            limit: Some(-5),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 1);
    }
}
