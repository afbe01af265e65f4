//! Query parameters for paginated list operations
//!
//! Values are taken as the caller sent them and normalized later by the
//! pagination helper, so out-of-range numbers are clamped instead of
//! rejected.
//!
//! # Example
//!
//! ```rust
//! use todo_service::handlers::ListQuery;
//! use todo_service::pagination::{PageLimits, SortDirection};
//!
//! let query = ListQuery::new()
//!     .with_page(-1)
//!     .with_size(500)
//!     .with_sort("createdAt")
//!     .with_direction("DESC");
//!
//! let request = query.to_page_request(&PageLimits::default());
//! assert_eq!(request.page(), 0);
//! assert_eq!(request.size(), 100);
//! assert_eq!(request.sort().map(|s| s.direction()), Some(SortDirection::Desc));
//! ```

use serde::{Deserialize, Serialize};

use crate::pagination::{PageLimits, PageRequest};

/// Query parameters for list operations
///
/// `page` is zero-based. `direction` is matched case-insensitively and
/// anything other than `desc` means ascending.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Page number (0-indexed). None defaults to 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Number of items per page. None uses the configured default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,

    /// Field name to sort by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    /// Sort direction (`asc` or `desc`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl ListQuery {
    /// Create a new empty query
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page number
    #[must_use]
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the number of items per page
    #[must_use]
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the sort field
    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Set the sort direction
    #[must_use]
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    /// Normalize into a page request
    pub fn to_page_request(&self, limits: &PageLimits) -> PageRequest {
        limits.request(
            self.page.unwrap_or(0),
            self.size.unwrap_or(0),
            self.sort.as_deref(),
            self.direction.as_deref(),
        )
    }
}
