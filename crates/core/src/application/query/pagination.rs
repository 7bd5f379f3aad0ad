// Page arithmetic: 1-based pages, out-of-range requests clamp

use serde::Serialize;

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

/// Resolved page position for a result set of known size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

impl PageWindow {
    /// Page < 1 floors to 1; page beyond the last clamps to the last.
    /// An empty set has zero pages and reports page 1.
    pub fn new(total_count: i64, requested_page: i64, page_size: i64) -> Self {
        let page_size = page_size.max(1);
        let total_count = total_count.max(0);
        let total_pages = (total_count + page_size - 1) / page_size;
        let current_page = requested_page.clamp(1, total_pages.max(1));

        Self {
            page_size,
            total_count,
            total_pages,
            current_page,
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.current_page - 1) * self.page_size
    }

    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            total_count: self.total_count,
            current_page: self.current_page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_page() {
        let w = PageWindow::new(45, 2, 20);
        assert_eq!(w.total_pages, 3);
        assert_eq!(w.current_page, 2);
        assert_eq!(w.offset(), 20);
        assert_eq!(w.limit(), 20);
    }

    #[test]
    fn test_page_beyond_last_clamps() {
        let w = PageWindow::new(45, 999, 20);
        assert_eq!(w.current_page, 3);
        assert_eq!(w.offset(), 40);
    }

    #[test]
    fn test_page_below_one_floors() {
        assert_eq!(PageWindow::new(45, 0, 20).current_page, 1);
        assert_eq!(PageWindow::new(45, -7, 20).current_page, 1);
    }

    #[test]
    fn test_empty_result_set() {
        let w = PageWindow::new(0, 5, 20);
        assert_eq!(w.total_pages, 0);
        assert_eq!(w.current_page, 1);
        assert_eq!(w.offset(), 0);

        let page: Page<i32> = w.into_page(Vec::new());
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn test_exact_multiple() {
        let w = PageWindow::new(40, 3, 20);
        assert_eq!(w.total_pages, 2);
        assert_eq!(w.current_page, 2);
    }
}
