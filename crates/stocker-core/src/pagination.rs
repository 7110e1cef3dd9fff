//! Offset pagination with RFC 5988 `Link` values.
//!
//! Raw `page` / `per_page` query values are validated here, before any store
//! access, and turned into a [`PageWindow`]. Once the store has reported the
//! unwindowed total, [`PageWindow::link_header`] builds the navigation links.

use serde::Serialize;

use crate::error::{Error, Result};

/// Largest accepted `per_page`
pub const MAX_PER_PAGE: u32 = 100;

/// A validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    page: u32,
    per_page: u32,
}

impl PageWindow {
    /// Build a window from already-typed values.
    pub fn new(page: u32, per_page: u32) -> Result<Self> {
        if page == 0 {
            return Err(Error::validation("page must be 1 or greater"));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(Error::validation(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        Ok(Self { page, per_page })
    }

    /// Parse raw query values. Missing values are rejected like malformed ones.
    pub fn parse(page: Option<&str>, per_page: Option<&str>) -> Result<Self> {
        let page = parse_count(page, "page")?;
        let per_page = parse_count(per_page, "per_page")?;
        Self::new(page, per_page)
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Rows to skip: `(page - 1) * per_page`.
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Rows to take: `per_page`.
    pub const fn limit(&self) -> u64 {
        self.per_page as u64
    }

    /// Last page for `total_count` rows, never below 1.
    pub const fn last_page(&self, total_count: u64) -> u64 {
        let pages = total_count.div_ceil(self.per_page as u64);
        if pages == 0 {
            1
        } else {
            pages
        }
    }

    /// Navigation links relative to `base_uri`, in `next, last, first, prev` order.
    ///
    /// Returns `None` when no link applies, including whenever `total_count` is 0.
    pub fn link_header(&self, base_uri: &str, total_count: u64) -> Option<String> {
        if total_count == 0 {
            return None;
        }

        let page = u64::from(self.page);
        let last = self.last_page(total_count);

        let candidates = [
            (page < last).then_some((page + 1, "next")),
            (last > 1 && page != last).then_some((last, "last")),
            (page > 1).then_some((1, "first")),
            (page > 1).then_some((page - 1, "prev")),
        ];

        let links = candidates
            .into_iter()
            .flatten()
            .filter(|(target, _)| (1..=last).contains(target))
            .map(|(target, rel)| {
                format!(
                    "<{base_uri}?page={target}&per_page={}>; rel=\"{rel}\"",
                    self.per_page
                )
            })
            .collect::<Vec<_>>();

        if links.is_empty() {
            None
        } else {
            Some(links.join(", "))
        }
    }
}

/// One page of rows plus the metadata a caller surfaces as response headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Rows in this window
    pub items: Vec<T>,
    /// Unwindowed row count (`Total-Count`)
    pub total_count: u64,
    /// Navigation links (`Link`), absent when none apply
    pub link: Option<String>,
}

impl<T> Page<T> {
    /// Assemble a page from a store query result.
    pub fn new(items: Vec<T>, total_count: u64, window: PageWindow, base_uri: &str) -> Self {
        Self {
            items,
            total_count,
            link: window.link_header(base_uri, total_count),
        }
    }
}

fn parse_count(raw: Option<&str>, field: &str) -> Result<u32> {
    let raw = raw.ok_or_else(|| Error::validation(format!("{field} is required")))?;
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(Error::validation(format!("{field} must be an integer")));
    }
    raw.parse::<u32>()
        .map_err(|_| Error::validation(format!("{field} is out of range")))
}
