//! Page Numbering

use crate::errors::LedgerError;

/// Page size used when the caller does not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page size accepted.
pub const MAX_PAGE_SIZE: u32 = 1_000;

/// A one-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// One-based page number.
    pub page: u32,

    /// Items per page.
    pub page_size: u32,
}

impl PageRequest {
    /// Build a request, falling back to page 1 and `default_size`, and
    /// clamping the size to `1..=max_size`.
    #[must_use]
    pub fn new(page: Option<u32>, page_size: Option<u32>, default_size: u32, max_size: u32) -> Self {
        Self {
            page: page.unwrap_or(1),
            page_size: page_size.unwrap_or(default_size).clamp(1, max_size.max(1)),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,

    /// Total items across all pages.
    pub count: usize,

    /// One-based page number.
    pub page: u32,

    /// Items per page.
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Next page number, if any.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        let shown = usize::try_from(u64::from(self.page) * u64::from(self.page_size)).ok()?;

        (shown < self.count).then(|| self.page.saturating_add(1))
    }

    /// Previous page number, if any.
    #[must_use]
    pub fn previous_page(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }

    /// Convert the items while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Cut `items` into the requested page.
///
/// Page 1 is always valid, even for an empty result set.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidPage`] for page 0 or a page past the end.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Result<Page<T>, LedgerError> {
    let count = items.len();

    if request.page == 0 {
        return Err(LedgerError::InvalidPage);
    }

    let size = usize::try_from(request.page_size).map_err(|_overflow| LedgerError::InvalidPage)?;
    let index = usize::try_from(request.page - 1).map_err(|_overflow| LedgerError::InvalidPage)?;
    let skip = index.checked_mul(size).ok_or(LedgerError::InvalidPage)?;

    if request.page > 1 && skip >= count {
        return Err(LedgerError::InvalidPage);
    }

    Ok(Page {
        items: items.into_iter().skip(skip).take(size).collect(),
        count,
        page: request.page,
        page_size: request.page_size,
    })
}
