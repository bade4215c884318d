//! Client-side filtering and pagination of fetched collections.

/// Page sizes a list can be switched to
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 20, 50];

/// Case-insensitive substring match of `query` against any of `fields`
///
/// A blank query matches everything.
pub fn matches_query(query: &str, fields: &[&str]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Client-side window over a fully fetched list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: PAGE_SIZE_OPTIONS[0],
        }
    }
}

impl Pager {
    /// Zero-based current page
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Move to `page`, clamped to the last page of `total` items
    pub fn set_page(&mut self, page: usize, total: usize) {
        self.page = page.min(self.page_count(total) - 1);
    }

    /// Switch page size; only the offered options are accepted
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            return false;
        }
        self.page_size = page_size;
        self.page = 0;
        true
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Slice of `items` on the current page
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }
}
