//! Pagination

use serde::{Deserialize, Serialize};

/// Requested page of a paged query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageableData {
    /// Zero-based page index.
    pub current_page: usize,

    /// Maximum number of results per page.
    pub page_size: usize,

    /// Sort code understood by the query, if any.
    pub sort: Option<String>,
}

impl PageableData {
    #[must_use]
    pub fn new(current_page: usize, page_size: usize) -> Self {
        Self {
            current_page,
            page_size,
            sort: None,
        }
    }

    #[must_use]
    pub fn sorted_by(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }
}

/// Page metadata returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub page_size: usize,
    pub sort: Option<String>,
    pub total_results: usize,
    pub page_count: usize,
    pub current_page: usize,
}

impl PageMetadata {
    /// Compute metadata for `total` results split into pages of `page_size`.
    ///
    /// The requested page is clamped to `0..=page_count`. The upper bound is
    /// the page count itself, one past the last page holding results, which
    /// existing callers rely on.
    pub fn new(pageable: &PageableData, total: usize) -> Self {
        let page_count = total.checked_div(pageable.page_size).map_or(0, |whole| {
            if total % pageable.page_size == 0 {
                whole
            } else {
                whole + 1
            }
        });

        Self {
            page_size: pageable.page_size,
            sort: pageable.sort.clone(),
            total_results: total,
            page_count,
            current_page: pageable.current_page.min(page_count),
        }
    }
}

/// One page of results plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage<T> {
    pub results: Vec<T>,
    pub pagination: PageMetadata,
}

/// Slice out page `page` of `items`, `page_size` items per page.
///
/// Returns an empty slice when the page starts past the end.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let Some(start) = page.checked_mul(page_size) else {
        return &[];
    };

    let end = start.saturating_add(page_size).min(items.len());

    items.get(start..end).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_returns_requested_window() {
        let items: Vec<u32> = (0..25).collect();

        assert_eq!(paginate(&items, 0, 10), (0..10).collect::<Vec<_>>());
        assert_eq!(paginate(&items, 2, 10), (20..25).collect::<Vec<_>>());
    }

    #[test]
    fn paginate_past_the_end_is_empty() {
        let items: Vec<u32> = (0..25).collect();

        assert!(paginate(&items, 3, 10).is_empty());
        assert!(paginate(&items, usize::MAX, 10).is_empty());
        assert!(paginate::<u32>(&[], 0, 10).is_empty());
    }

    #[test]
    fn page_count_rounds_up() {
        let meta = PageMetadata::new(&PageableData::new(0, 10), 25);

        assert_eq!(meta.page_count, 3);
        assert_eq!(meta.total_results, 25);
        assert_eq!(PageMetadata::new(&PageableData::new(0, 5), 25).page_count, 5);
    }

    #[test]
    fn current_page_clamps_to_page_count() {
        let meta = PageMetadata::new(&PageableData::new(5, 10), 25);

        assert_eq!(meta.current_page, 3);
        assert_eq!(PageMetadata::new(&PageableData::new(1, 10), 25).current_page, 1);
    }

    #[test]
    fn zero_page_size_yields_no_pages() {
        let meta = PageMetadata::new(&PageableData::new(2, 0), 25);

        assert_eq!(meta.page_count, 0);
        assert_eq!(meta.current_page, 0);
    }

    #[test]
    fn sort_code_is_carried_through() {
        let meta = PageMetadata::new(&PageableData::new(0, 10).sorted_by("byTotal"), 0);

        assert_eq!(meta.sort.as_deref(), Some("byTotal"));
        assert_eq!(meta.page_count, 0);
    }
}
