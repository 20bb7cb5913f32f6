//! View controls, query parameters and pagination metadata

use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page size used when neither the caller nor the view config picks one
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Sort direction for a view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Apply this direction to an ascending comparison result
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed sort expression
///
/// # Format
/// - `field` or `field:asc` (ascending)
/// - `field:desc` (descending)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl FromStr for SortSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, "asc")) => (field, SortDirection::Asc),
            Some((field, "desc")) => (field, SortDirection::Desc),
            Some((_, other)) => {
                return Err(ValidationError::field(
                    "sort",
                    format!("unknown sort direction '{}', expected asc or desc", other),
                ));
            }
            None => (s, SortDirection::Asc),
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(ValidationError::field("sort", "sort field must not be empty"));
        }

        Ok(SortSpec {
            field: field.to_string(),
            direction,
        })
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction)
    }
}

/// Caller-owned state driving a list view
///
/// Controls are created with defaults when a view mounts and updated as
/// the user types, clicks column headers or changes page. The engine only
/// reads them; the clamped page it reports back can be adopted with
/// [`Controls::adopt`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    /// Case-insensitive substring to match against searchable fields
    pub search: String,

    /// Field to order by; `None` keeps insertion order
    pub sort_key: Option<String>,

    /// Direction applied when `sort_key` is set
    pub direction: SortDirection,

    /// Records per page, must be positive
    pub page_size: usize,

    /// 1-based page index
    pub page: usize,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort_key: None,
            direction: SortDirection::Asc,
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

impl Controls {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Update the search term; results restart at the first page
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    /// Order by `field` in the given direction
    pub fn sort_by(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.sort_key = Some(field.into());
        self.direction = direction;
    }

    /// Column-header behaviour: same field flips, a new field starts ascending
    pub fn toggle_sort(&mut self, field: &str) {
        if self.sort_key.as_deref() == Some(field) {
            self.direction = self.direction.flipped();
        } else {
            self.sort_key = Some(field.to_string());
            self.direction = SortDirection::Asc;
        }
    }

    pub fn clear_sort(&mut self) {
        self.sort_key = None;
        self.direction = SortDirection::Asc;
    }

    /// Change the page size; results restart at the first page
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page = 1;
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Advance one page, stopping at the last page of `meta`
    pub fn next_page(&mut self, meta: &PaginationMeta) {
        self.page = (meta.current_page + 1).min(meta.total_pages);
    }

    /// Go back one page, stopping at the first
    pub fn prev_page(&mut self, meta: &PaginationMeta) {
        self.page = meta.current_page.saturating_sub(1).max(1);
    }

    /// Take over the page the engine actually rendered
    pub fn adopt<R>(&mut self, result: &ViewResult<R>) {
        self.page = result.pagination.current_page;
    }

    /// The sort expression currently in effect, if any
    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort_key.as_ref().map(|field| SortSpec {
            field: field.clone(),
            direction: self.direction,
        })
    }
}

/// Query-string form of [`Controls`]
///
/// Every parameter is optional; missing ones fall back to the view's
/// defaults.
///
/// # Example
/// ```text
/// GET /api/candidates?search=developer&sort=match_score:desc&page=2&limit=3
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewQuery {
    /// Search term
    pub search: Option<String>,

    /// Sort expression, `field`, `field:asc` or `field:desc`
    pub sort: Option<String>,

    /// Page number (starts at 1)
    pub page: Option<usize>,

    /// Number of records per page
    pub limit: Option<usize>,
}

impl ViewQuery {
    /// Overlay the supplied parameters onto a view's default controls
    pub fn into_controls(self, defaults: &Controls) -> Result<Controls, ValidationError> {
        let mut controls = defaults.clone();

        if let Some(search) = self.search {
            controls.search = search;
        }
        if let Some(sort) = self.sort.filter(|s| !s.trim().is_empty()) {
            let spec: SortSpec = sort.parse()?;
            controls.sort_by(spec.field, spec.direction);
        }
        if let Some(limit) = self.limit {
            controls.page_size = limit;
        }
        if let Some(page) = self.page {
            controls.page = page;
        }

        Ok(controls)
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Page actually rendered (1-based, clamped into range)
    pub current_page: usize,

    /// Number of records per page
    pub page_size: usize,

    /// Number of records passing the search filter
    pub total_matched: usize,

    /// Total number of pages, at least 1
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Compute metadata for a requested page, clamping it into range
    ///
    /// `page_size` must already be known to be positive.
    pub fn new(requested_page: usize, page_size: usize, total_matched: usize) -> Self {
        let total_pages = total_matched.div_ceil(page_size).max(1);
        let current_page = requested_page.clamp(1, total_pages);

        Self {
            current_page,
            page_size,
            total_matched,
            total_pages,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
        }
    }

    /// Index range of the current page within the matched sequence
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(self.total_matched);
        let end = (start + self.page_size).min(self.total_matched);
        start..end
    }
}

/// The engine's output: the current page plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewResult<R> {
    /// Records on the current page, in filtered and sorted order
    pub visible_records: Vec<R>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<R> ViewResult<R> {
    pub fn total_matched(&self) -> usize {
        self.pagination.total_matched
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current_page
    }

    /// Transform the visible records, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(R) -> U) -> ViewResult<U> {
        ViewResult {
            visible_records: self.visible_records.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
