//! Page/limit query parameters shared by list endpoints.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    /// Resolve to `(limit, offset)`, clamping the limit to `1..=max_limit`
    /// and treating pages below 1 as the first page.
    pub fn resolve(&self, max_limit: i64) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, max_limit.max(1));
        let page = self.page.unwrap_or(1).max(1);
        (limit, (page - 1) * limit)
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Envelope for paginated list responses.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, params: &PageParams, limit: i64, total: i64) -> Self {
        Self {
            items,
            page: params.page(),
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let params = PageParams::default();
        assert_eq!(params.resolve(100), (DEFAULT_PAGE_SIZE, 0));
    }

    #[test]
    fn clamps_limit_and_page() {
        let params = PageParams {
            page: Some(0),
            limit: Some(500),
        };
        assert_eq!(params.resolve(100), (100, 0));

        let params = PageParams {
            page: Some(3),
            limit: Some(0),
        };
        assert_eq!(params.resolve(100), (1, 2));
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PageParams {
            page: Some(2),
            limit: Some(10),
        };
        let page = Page::new(vec![1, 2, 3], &params, 10, 21);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 2);
    }
}
