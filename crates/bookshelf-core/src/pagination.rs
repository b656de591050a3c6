//! Page arithmetic for list endpoints.

use serde::Serialize;

use crate::validation::{ValidationError, ValidationResult};

/// Page number used when the client does not send one.
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when the client does not send one.
pub const DEFAULT_LIMIT: u64 = 10;

/// A validated `page`/`limit` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Validate raw query values. Both must be positive and `limit` may not
    /// exceed `max_limit`.
    pub fn new(page: Option<u64>, limit: Option<u64>, max_limit: u64) -> ValidationResult<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page == 0 {
            return Err(ValidationError::invalid("page", "must be a positive integer"));
        }
        if limit == 0 {
            return Err(ValidationError::invalid("limit", "must be a positive integer"));
        }
        if limit > max_limit {
            return Err(ValidationError::invalid(
                "limit",
                format!("must not exceed {max_limit}"),
            ));
        }

        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of records before this page.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`; zero for an empty collection.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        Self {
            items,
            total_count,
            total_pages: request.total_pages(total_count),
            current_page: request.page(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = PageRequest::new(None, None, 100).unwrap();
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.skip(), 0);
    }

    #[test]
    fn test_skip() {
        let request = PageRequest::new(Some(3), Some(10), 100).unwrap();
        assert_eq!(request.skip(), 20);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let request = PageRequest::new(None, Some(10), 100).unwrap();
        assert_eq!(request.total_pages(0), 0);
        assert_eq!(request.total_pages(1), 1);
        assert_eq!(request.total_pages(10), 1);
        assert_eq!(request.total_pages(11), 2);
        assert_eq!(request.total_pages(95), 10);
    }

    #[test]
    fn test_rejects_zero() {
        assert!(PageRequest::new(Some(0), None, 100).is_err());
        assert!(PageRequest::new(None, Some(0), 100).is_err());
    }

    #[test]
    fn test_rejects_oversized_limit() {
        let err = PageRequest::new(None, Some(101), 100).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let request = PageRequest::new(Some(2), Some(1), 100).unwrap();
        let page = Page::new(vec!["b"], 3, request);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalCount"], 3);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["items"][0], "b");
    }
}
