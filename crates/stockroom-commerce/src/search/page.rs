//! Client-side pagination.

use serde::{Deserialize, Serialize};

/// Pagination info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub current_page: usize,
    /// Items per page.
    pub per_page: usize,
    /// Total number of pages. Zero when there are no items.
    pub total_pages: usize,
    /// Total number of items.
    pub total_items: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Create pagination info. `page` and `per_page` are clamped to at least 1.
    pub fn new(page: usize, per_page: usize, total_items: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page);
        Self {
            current_page: page,
            per_page,
            total_pages,
            total_items,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.current_page - 1).saturating_mul(self.per_page)
    }

    /// Page numbers to link to, at most `max_visible` around the current page.
    pub fn page_numbers(&self, max_visible: usize) -> Vec<usize> {
        if self.total_pages <= max_visible {
            return (1..=self.total_pages).collect();
        }
        let half = max_visible / 2;
        let start = self.current_page.saturating_sub(half).max(1);
        let end = start
            .saturating_add(max_visible.saturating_sub(1))
            .min(self.total_pages);
        let start = end.saturating_add(1).saturating_sub(max_visible).max(1);
        (start..=end).collect()
    }
}

/// One page of items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Slice `items` to the requested page.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let pagination = Pagination::new(page, per_page, items.len());
    let items = items
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.per_page)
        .collect();
    Page { items, pagination }
}
