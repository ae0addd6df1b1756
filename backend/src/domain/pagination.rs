//! Offset pagination primitives shared by admin and storefront listings.

/// Default page size when the client does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 25;
/// Upper bound on page size; larger requests are clamped, not rejected.
pub const MAX_PER_PAGE: u32 = 100;

/// A validated listing request.
///
/// Pages are 1-based. Out-of-range values are clamped so that a hand-edited
/// query string degrades gracefully instead of failing the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
    search: Option<String>,
    descending: bool,
}

impl PageRequest {
    /// Build a request, clamping `page` to at least 1 and `per_page` into
    /// `1..=MAX_PER_PAGE`.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            search: None,
            descending: false,
        }
    }

    /// Attach a search filter; blank input clears it.
    #[must_use]
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }

    /// Reverse the listing order.
    #[must_use]
    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Optional search filter.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Whether the listing order is reversed.
    pub fn is_descending(&self) -> bool {
        self.descending
    }

    /// Row offset for the backing query.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// Row limit for the backing query.
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of results plus the total count across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Build a page echoing the request that produced it.
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            per_page: request.per_page(),
        }
    }

    /// Map the page's items while keeping the envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Number of pages needed for `total` items.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 1, 1)]
    #[case(1, 25, 1, 25)]
    #[case(3, 1_000, 3, MAX_PER_PAGE)]
    fn new_clamps_bounds(
        #[case] page: u32,
        #[case] per_page: u32,
        #[case] expected_page: u32,
        #[case] expected_per_page: u32,
    ) {
        let request = PageRequest::new(page, per_page);
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.per_page(), expected_per_page);
    }

    #[rstest]
    #[case(1, 25, 0)]
    #[case(2, 25, 25)]
    #[case(4, 10, 30)]
    fn offset_follows_page(#[case] page: u32, #[case] per_page: u32, #[case] expected: i64) {
        assert_eq!(PageRequest::new(page, per_page).offset(), expected);
    }

    #[test]
    fn blank_search_is_dropped() {
        let request = PageRequest::default().with_search(Some("   ".to_owned()));
        assert_eq!(request.search(), None);
    }

    #[rstest]
    #[case(0, 25, 0)]
    #[case(1, 25, 1)]
    #[case(26, 25, 2)]
    #[case(50, 25, 2)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] per_page: u32, #[case] expected: u64) {
        let page = Page::<u8>::new(Vec::new(), total, &PageRequest::new(1, per_page));
        assert_eq!(page.total_pages(), expected);
    }

    #[test]
    fn map_preserves_envelope() {
        let request = PageRequest::new(2, 10);
        let page = Page::new(vec![1, 2, 3], 23, &request).map(|n| n * 2);
        assert_eq!(page.items, vec![2, 4, 6]);
        assert_eq!(page.total, 23);
        assert_eq!(page.page, 2);
    }
}
