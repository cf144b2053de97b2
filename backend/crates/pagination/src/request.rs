//! Validated page request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size applied when the caller does not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validation errors returned when constructing a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Page numbers start at 1.
    #[error("page number must be at least 1")]
    ZeroPage,
    /// Page size must be at least 1.
    #[error("page size must be at least 1")]
    ZeroSize,
    /// Page size exceeds [`MAX_PAGE_SIZE`].
    #[error("page size {size} exceeds the maximum of {max}")]
    SizeTooLarge {
        /// Requested size.
        size: u32,
        /// Largest accepted size.
        max: u32,
    },
    /// Sort expression is empty after trimming.
    #[error("sort expression must not be blank")]
    BlankSort,
    /// Filter field name is empty after trimming.
    #[error("filter name must not be blank")]
    BlankFilterName,
}

/// A request for one page of a listing.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= size <= MAX_PAGE_SIZE`
/// - `sort`, when present, is non-blank
/// - filter names are non-blank
///
/// Serialisation omits `sort` when absent and `filters` when empty, so the
/// serialised form of a plain request is exactly `{"page":..,"size":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PageRequestDto")]
pub struct PageRequest {
    page: u32,
    size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    filters: BTreeMap<String, String>,
}

impl PageRequest {
    /// Build a request for `page` with `size` items per page.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when the page is zero or the size is
    /// zero or larger than [`MAX_PAGE_SIZE`].
    pub fn new(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if size == 0 {
            return Err(PageRequestError::ZeroSize);
        }
        if size > MAX_PAGE_SIZE {
            return Err(PageRequestError::SizeTooLarge {
                size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self {
            page,
            size,
            sort: None,
            filters: BTreeMap::new(),
        })
    }

    /// Attach a sort expression such as `price desc`.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::BlankSort`] when the expression is blank.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Result<Self, PageRequestError> {
        let raw = sort.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PageRequestError::BlankSort);
        }
        self.sort = Some(trimmed.to_owned());
        Ok(self)
    }

    /// Add an equality filter, replacing any previous value for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::BlankFilterName`] when `name` is blank.
    pub fn with_filter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, PageRequestError> {
        let raw_name = name.into();
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return Err(PageRequestError::BlankFilterName);
        }
        self.filters.insert(trimmed.to_owned(), value.into());
        Ok(self)
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Sort expression, if any.
    #[must_use]
    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    /// Equality filters keyed by field name.
    #[must_use]
    pub const fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
            filters: BTreeMap::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PageRequestDto {
    page: u32,
    size: u32,
    #[serde(default)]
    sort: Option<String>,
    #[serde(default)]
    filters: BTreeMap<String, String>,
}

impl TryFrom<PageRequestDto> for PageRequest {
    type Error = PageRequestError;

    fn try_from(dto: PageRequestDto) -> Result<Self, Self::Error> {
        let PageRequestDto {
            page,
            size,
            sort,
            filters,
        } = dto;
        let mut request = Self::new(page, size)?;
        if let Some(expression) = sort {
            request = request.with_sort(expression)?;
        }
        for (name, value) in filters {
            request = request.with_filter(name, value)?;
        }
        Ok(request)
    }
}
