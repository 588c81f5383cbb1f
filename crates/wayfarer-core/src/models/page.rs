//! Pagination envelope and sort specification types.
//!
//! Every paged query accepts a [`PageRequest`] and returns a [`Page`]. Page
//! indices are 0-based. Requesting a page past the end of the result set is
//! not an error: the content is empty and `total_elements` still reflects
//! the full match count.

use serde::{Deserialize, Serialize};

/// Sort direction for an explicit sort specification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Optional sort specification for paged queries.
///
/// The field name is validated against a per-query whitelist; unknown fields
/// are rejected with `InvalidInput` rather than interpolated into SQL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortSpec {
    /// Logical field name to sort by (e.g. "created_at", "rating")
    pub field: String,
    /// Sort direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    /// Ascending sort on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Parameters for requesting one page of a result set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based page index
    pub page: u32,
    /// Number of rows per page
    pub size: u32,
    /// Optional sort; each query defines its own default ordering
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

impl PageRequest {
    /// A request for the given page index and size, with default ordering.
    pub fn of(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    /// Attach an explicit sort specification.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.size.max(1))
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page) * self.limit()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::of(0, 20)
    }
}

/// One page of results together with the total match count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    /// Rows on this page, in query order
    pub content: Vec<T>,
    /// Total number of rows matching the query across all pages
    pub total_elements: u64,
    /// 0-based index of this page
    pub page: u32,
    /// Requested page size
    pub size: u32,
}

impl<T> Page<T> {
    pub(crate) fn new(content: Vec<T>, total_elements: u64, request: &PageRequest) -> Self {
        Self {
            content,
            total_elements,
            page: request.page,
            size: request.size,
        }
    }

    /// Total number of pages needed to hold all matching rows.
    pub fn total_pages(&self) -> u32 {
        let size = u64::from(self.size.max(1));
        self.total_elements.div_ceil(size) as u32
    }

    /// Whether a page with a higher index holds further rows.
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages()
    }

    /// Whether this is not the first page, regardless of overrun.
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Whether this page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
