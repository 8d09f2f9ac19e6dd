//! Pagination shared by the index, group and profile feeds

use serde::{Deserialize, Serialize};

/// Default number of posts per page
pub const OBJECTS_PER_PAGE: u32 = 10;

/// Upper bound for a configured page size
const MAX_PER_PAGE: u32 = 100;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (max 100)
    pub per_page: u32,
}

impl Pagination {
    /// Page number that always resolves to the last page
    pub const LAST_PAGE: u32 = u32::MAX;

    /// Create pagination with validation.
    ///
    /// - Page is clamped to minimum of 1
    /// - Per page is clamped to 1..=100
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Build from the `?page=` query parameter.
    ///
    /// A missing or non-integer value selects the first page. An integer
    /// that names no page (zero, negative, past the end) selects the last.
    pub fn from_params(params: &PaginationParams, per_page: u32) -> Self {
        let page = match params.page.as_deref().map(str::trim) {
            Some(raw) if is_integer(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .unwrap_or(Self::LAST_PAGE),
            _ => 1,
        };
        Self::new(page, per_page)
    }

    /// Number of pages needed for `total` items (never less than 1).
    pub fn total_pages(total: i64, per_page: u32) -> u32 {
        let total = total.max(0) as u64;
        let per_page = u64::from(per_page.max(1));
        (total.div_ceil(per_page) as u32).max(1)
    }

    /// Move a page past the end back to the last page.
    pub fn clamp_to(self, total: i64) -> Self {
        Self {
            page: self.page.min(Self::total_pages(total, self.per_page)),
            per_page: self.per_page,
        }
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> u32 {
        self.per_page
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: OBJECTS_PER_PAGE,
        }
    }
}

fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    /// Current page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl<T> Paginated<T> {
    /// Slice an in-memory, already ordered collection.
    pub fn from_slice(all: &[T], page: Pagination) -> Self
    where
        T: Clone,
    {
        let total = all.len() as i64;
        let page = page.clamp_to(total);
        let items = all
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        Self {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        }
    }

    /// Calculate total number of pages.
    pub fn total_pages(&self) -> u32 {
        Pagination::total_pages(self.total, self.per_page)
    }

    /// Check if there's a next page.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there's a previous page.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }

    pub fn prev_page(&self) -> Option<u32> {
        self.has_prev().then(|| self.page - 1)
    }

    /// Convert items while keeping page bookkeeping.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Query parameters for pagination
///
/// Kept as a string so junk like `?page=abc` falls back to page 1
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: &str) -> PaginationParams {
        PaginationParams {
            page: Some(page.to_owned()),
        }
    }

    #[test]
    fn offset_calculation() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(2, 10).offset(), 10);
        assert_eq!(Pagination::new(3, 25).offset(), 50);
    }

    #[test]
    fn clamps_page_and_per_page() {
        assert_eq!(Pagination::new(0, 10).page, 1);
        assert_eq!(Pagination::new(1, 0).per_page, 1);
        assert_eq!(Pagination::new(1, 999).per_page, 100);
    }

    #[test]
    fn non_integer_pages_select_first() {
        for raw in ["abc", "", "2.0", "1e3", "-", "+"] {
            assert_eq!(Pagination::from_params(&params(raw), 10).page, 1, "{raw:?}");
        }
        assert_eq!(
            Pagination::from_params(&PaginationParams::default(), 10).page,
            1
        );
    }

    #[test]
    fn integer_pages_out_of_range_select_last() {
        assert_eq!(Pagination::from_params(&params("2"), 10).page, 2);
        assert_eq!(Pagination::from_params(&params(" +2 "), 10).page, 2);

        for raw in ["0", "-1", "-0", "99999999999", "123456789012345678901234567890"] {
            let page = Pagination::from_params(&params(raw), 10);
            assert_eq!(page.page, Pagination::LAST_PAGE, "{raw:?}");
            assert_eq!(page.clamp_to(13).page, 2, "{raw:?}");
        }
    }

    #[test]
    fn past_the_end_is_last_page() {
        let page = Pagination::new(9, 10).clamp_to(13);
        assert_eq!(page.page, 2);

        let page = Pagination::new(5, 10).clamp_to(0);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn thirteen_posts_split_ten_and_three() {
        let posts: Vec<u32> = (0..13).collect();

        let first = Paginated::from_slice(&posts, Pagination::new(1, OBJECTS_PER_PAGE));
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.next_page(), Some(2));
        assert_eq!(first.prev_page(), None);

        let second = Paginated::from_slice(&posts, Pagination::new(2, OBJECTS_PER_PAGE));
        assert_eq!(second.items, vec![10, 11, 12]);
        assert_eq!(second.next_page(), None);
        assert_eq!(second.prev_page(), Some(1));
    }

    #[test]
    fn total_pages() {
        let empty: Paginated<()> = Paginated {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 10,
        };
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_next());

        let paginated: Paginated<()> = Paginated {
            items: vec![],
            total: 25,
            page: 2,
            per_page: 10,
        };
        assert_eq!(paginated.total_pages(), 3);
        assert!(paginated.has_next());
        assert!(paginated.has_prev());
    }

    #[test]
    fn map_keeps_bookkeeping() {
        let page = Paginated::from_slice(&[1, 2, 3], Pagination::new(2, 2)).map(|n| n * 10);
        assert_eq!(page.items, vec![30]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total, 3);
    }
}
