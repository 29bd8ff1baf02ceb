//! Fixed-size pagination over the filtered/sorted task list.
//!
//! The page state never filters on its own: it slices whatever the pipeline
//! produced. Whenever the filtered list changes for any reason the caller
//! resets to page 1, so a stale page number can never point past the new
//! total.

/// Current page number and fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    page: usize,
    page_size: usize,
}

impl PageState {
    /// A page state at page 1. `page_size` must be at least 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total page count for `count` items: ceil(count / page_size), minimum 1.
    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size).max(1)
    }

    /// Reset to page 1. Called whenever the filtered list changes.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Jump to a page, clamped to `[1, total_pages]`.
    pub fn goto(&mut self, page: usize, count: usize) {
        self.page = page.clamp(1, self.total_pages(count));
    }

    pub fn next(&mut self, count: usize) {
        self.goto(self.page + 1, count);
    }

    pub fn prev(&mut self, count: usize) {
        self.goto(self.page.saturating_sub(1), count);
    }

    /// The contiguous slice `[(page-1)*size, page*size)` of `items`.
    /// Clamps the current page first, so a shrunken list never yields an
    /// out-of-range window.
    pub fn slice<'a, T>(&mut self, items: &'a [T]) -> &'a [T] {
        self.goto(self.page, items.len());
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(items.len());
        if start >= items.len() {
            return &[];
        }
        &items[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceil_with_minimum_one() {
        let state = PageState::new(12);
        assert_eq!(state.total_pages(0), 1);
        assert_eq!(state.total_pages(12), 1);
        assert_eq!(state.total_pages(13), 2);
        assert_eq!(state.total_pages(25), 3);
    }

    #[test]
    fn goto_clamps_to_valid_range() {
        let mut state = PageState::new(12);
        state.goto(4, 25); // 25 items -> 3 pages
        assert_eq!(state.page(), 3);
        state.goto(0, 25);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut state = PageState::new(10);
        state.prev(35);
        assert_eq!(state.page(), 1);
        state.next(35);
        state.next(35);
        state.next(35);
        state.next(35); // would be page 5 of 4
        assert_eq!(state.page(), 4);
    }

    #[test]
    fn pages_partition_the_list_exactly() {
        let items: Vec<u32> = (0..25).collect();
        let mut state = PageState::new(12);

        let mut seen = Vec::new();
        for page in 1..=state.total_pages(items.len()) {
            state.goto(page, items.len());
            seen.extend_from_slice(state.slice(&items));
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn slice_after_shrink_clamps_instead_of_panicking() {
        let mut state = PageState::new(10);
        let many: Vec<u32> = (0..30).collect();
        state.goto(3, many.len());
        assert_eq!(state.slice(&many), &many[20..30]);

        // List shrank underneath the page state
        let few: Vec<u32> = (0..5).collect();
        assert_eq!(state.slice(&few), &few[..]);
        assert_eq!(state.page(), 1);
    }
}
