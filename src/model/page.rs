//! Page - one slice of a paginated listing plus the backend's total count.

/// One page of a listing. `page` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, page: usize, limit: usize) -> Self {
        Self {
            items,
            total,
            page,
            limit,
        }
    }

    pub fn empty(page: usize, limit: usize) -> Self {
        Self::new(Vec::new(), 0, page, limit)
    }

    /// Number of pages needed for `total` items (at least 1).
    pub fn page_count(&self) -> usize {
        if self.limit == 0 || self.total == 0 {
            return 1;
        }
        self.total.div_ceil(self.limit)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page * self.limit < self.total
    }
}

/// Slice `items` the way json-server does for `_page`/`_limit`.
pub(crate) fn paginate<T: Clone>(items: &[T], page: usize, limit: usize) -> Vec<T> {
    if limit == 0 {
        return items.to_vec();
    }
    let start = page.saturating_sub(1).saturating_mul(limit);
    items.iter().skip(start).take(limit).cloned().collect()
}
