//! Paginated result envelope.

use serde::{Deserialize, Serialize};

use crate::PageRequest;

/// One page of a listing plus the metadata needed to navigate the rest.
///
/// The envelope serialises with camelCase field names:
/// `items`, `totalItems`, `page`, `size`, `totalPages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    items: Vec<T>,
    total_items: u64,
    page: u32,
    size: u32,
    total_pages: u64,
}

impl<T> Paginated<T> {
    /// Wrap the items of `request`'s page together with the listing total.
    #[must_use]
    pub fn new(items: Vec<T>, total_items: u64, request: &PageRequest) -> Self {
        let size = request.size();
        Self {
            items,
            total_items,
            page: request.page(),
            size,
            total_pages: total_items.div_ceil(u64::from(size.max(1))),
        }
    }

    /// Build a zero-result page for `request`.
    #[must_use]
    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items across every page.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    /// 1-based number of this page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Requested page size.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of pages in the listing.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// True when the page carries no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    //! Envelope metadata coverage.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(10, 1)]
    #[case(11, 2)]
    #[case(95, 10)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] pages: u64) {
        let request = PageRequest::new(1, 10).expect("valid request");
        let page = Paginated::new(Vec::<u8>::new(), total, &request);
        assert_eq!(page.total_pages(), pages);
    }

    #[rstest]
    fn empty_page_reports_empty() {
        let request = PageRequest::new(3, 5).expect("valid request");
        let page: Paginated<u8> = Paginated::empty(&request);
        assert!(page.is_empty());
        assert_eq!(page.page(), 3);
        assert_eq!(page.size(), 5);
        assert_eq!(page.total_items(), 0);
    }

    #[rstest]
    fn envelope_uses_camel_case_fields() {
        let request = PageRequest::new(1, 2).expect("valid request");
        let page = Paginated::new(vec![7_u8, 8], 3, &request);
        let json = serde_json::to_value(&page).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "items": [7, 8],
                "totalItems": 3,
                "page": 1,
                "size": 2,
                "totalPages": 2,
            })
        );
    }
}
