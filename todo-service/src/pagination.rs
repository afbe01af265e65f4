//! Pagination helper
//!
//! Turns raw, untrusted paging parameters into a normalized [`PageRequest`]
//! and turns a [`Page`] of results into the transport-friendly
//! [`PageEnvelope`]. Everything here is stateless.
//!
//! ```rust
//! use todo_service::pagination::{build_page_request, SortDirection, MAX_PAGE_SIZE};
//!
//! let request = build_page_request(-3, 500, Some("title"), Some("DESC"));
//! assert_eq!(request.page(), 0);
//! assert_eq!(request.size(), MAX_PAGE_SIZE);
//! assert_eq!(request.sort().map(|s| s.direction()), Some(SortDirection::Desc));
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Page size used when the caller asks for zero or a negative size
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller can obtain
pub const MAX_PAGE_SIZE: u32 = 100;

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Asc,
    /// Sort in descending order (Z-A, 9-0)
    Desc,
}

impl SortDirection {
    /// Parse a direction leniently: `desc` in any case is descending,
    /// anything else (including nothing) is ascending.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    /// Apply this direction to an ascending ordering
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// A single sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    field: String,
    direction: SortDirection,
}

impl Sort {
    /// Create a sort key
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// The field name as supplied by the caller
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The sort direction
    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// A normalized page request
///
/// Pages are zero-based. Values built through [`build_page_request`] or
/// [`PageLimits::request`] always have `size` in `1..=max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Option<Sort>,
}

impl PageRequest {
    /// Create a page request from already-valid values
    ///
    /// A size of zero is bumped to one.
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.max(1),
            sort: None,
        }
    }

    /// Attach a sort key
    #[must_use]
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Zero-based page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Sort key, `None` meaning natural (identifier) order
    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// Number of items to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Bounds applied when normalizing page parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    /// Size used when the requested size is zero or negative
    pub default_size: u32,
    /// Upper bound for the page size
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    /// Normalize raw paging parameters against these limits
    pub fn request(
        &self,
        page: i64,
        size: i64,
        sort_field: Option<&str>,
        direction: Option<&str>,
    ) -> PageRequest {
        let max_size = self.max_size.max(1);
        let page = u32::try_from(page.max(0)).unwrap_or(u32::MAX);
        let size = if size <= 0 {
            self.default_size.clamp(1, max_size)
        } else {
            u32::try_from(size).unwrap_or(u32::MAX).min(max_size)
        };

        let request = PageRequest::new(page, size);
        match sort_field.map(str::trim).filter(|f| !f.is_empty()) {
            Some(field) => {
                request.with_sort(Sort::new(field, SortDirection::parse_lenient(direction)))
            }
            None => request,
        }
    }
}

/// Build a page request with the default limits
///
/// - negative pages become page 0
/// - a size of zero or less becomes [`DEFAULT_PAGE_SIZE`]
/// - a size above [`MAX_PAGE_SIZE`] becomes [`MAX_PAGE_SIZE`]
/// - a missing or blank sort field means unsorted
pub fn build_page_request(
    page: i64,
    size: i64,
    sort_field: Option<&str>,
    direction: Option<&str>,
) -> PageRequest {
    PageLimits::default().request(page, size, sort_field, direction)
}

/// Entities that can be ordered by a named field in memory
pub trait SortableFields {
    /// Compare two values by `field` in ascending order
    ///
    /// Returns `None` when the field is not sortable.
    fn compare_field(&self, other: &Self, field: &str) -> Option<Ordering>;
}

/// Sort `items` in place according to `sort`
///
/// Unknown fields leave the slice untouched. The sort is stable so ties keep
/// their natural order.
pub fn sort_by_request<T: SortableFields>(items: &mut [T], sort: Option<&Sort>) {
    let Some(sort) = sort else {
        return;
    };
    let (Some(first), Some(second)) = (items.first(), items.get(1)) else {
        return;
    };
    if first.compare_field(second, sort.field()).is_none() {
        return;
    }
    items.sort_by(|a, b| {
        sort.direction()
            .apply(a.compare_field(b, sort.field()).unwrap_or(Ordering::Equal))
    });
}

/// One page of results plus the numbers needed to describe it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    content: Vec<T>,
    page_number: u32,
    page_size: u32,
    total_elements: u64,
}

impl<T> Page<T> {
    /// Create a page from its content and the request that produced it
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page_number: request.page(),
            page_size: request.size(),
            total_elements,
        }
    }

    /// Cut a page out of an already-ordered slice
    pub fn from_slice(items: &[T], request: &PageRequest) -> Self
    where
        T: Clone,
    {
        let total = items.len() as u64;
        let start = usize::try_from(request.offset()).unwrap_or(usize::MAX).min(items.len());
        let end = start.saturating_add(request.size() as usize).min(items.len());
        Self::new(items[start..end].to_vec(), request, total)
    }

    /// Items on this page
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Zero-based page number
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Requested page size
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Total items across every page
    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// Number of pages needed to hold `total_elements`
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.page_size))
    }

    /// Whether this is the first page
    pub fn is_first(&self) -> bool {
        self.page_number == 0
    }

    /// Whether no page follows this one
    pub fn is_last(&self) -> bool {
        u64::from(self.page_number) + 1 >= self.total_pages()
    }

    /// Convert the content while keeping the paging numbers
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
        }
    }
}

/// Transport-facing description of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// Items on this page
    pub content: Vec<T>,
    /// Zero-based page number
    pub page_number: u32,
    /// Requested page size
    pub page_size: u32,
    /// Total items across every page
    pub total_elements: u64,
    /// Number of pages
    pub total_pages: u64,
    /// Whether this is the first page
    pub is_first: bool,
    /// Whether this is the last page
    pub is_last: bool,
}

/// Describe a page for transport
pub fn build_page_envelope<T>(page: Page<T>) -> PageEnvelope<T> {
    let total_pages = page.total_pages();
    let is_first = page.is_first();
    let is_last = page.is_last();
    PageEnvelope {
        page_number: page.page_number,
        page_size: page.page_size,
        total_elements: page.total_elements,
        total_pages,
        is_first,
        is_last,
        content: page.content,
    }
}

impl<T> From<Page<T>> for PageEnvelope<T> {
    fn from(page: Page<T>) -> Self {
        build_page_envelope(page)
    }
}
