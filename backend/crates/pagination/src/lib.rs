//! Page-number pagination primitives shared by product read endpoints.
//!
//! The crate exposes two types:
//!
//! - [`PageRequest`] describes which slice of a listing the caller wants:
//!   a 1-based page number, a page size, an optional sort expression and a
//!   set of equality filters. Requests are validated on construction and on
//!   deserialisation, so an invalid request cannot exist.
//! - [`Paginated`] is the envelope returned by listings: the items of the
//!   requested page together with the total item count and page metadata.
//!
//! Filters are stored in a sorted map so two requests with the same filters
//! compare and serialise identically regardless of insertion order.
//!
//! # Examples
//!
//! ```
//! use pagination::{PageRequest, Paginated};
//!
//! let request = PageRequest::new(2, 10)?.with_filter("category", "books")?;
//! let page = Paginated::new(vec!["a", "b"], 12, &request);
//! assert_eq!(page.total_pages(), 2);
//! assert!(!page.is_empty());
//! # Ok::<(), pagination::PageRequestError>(())
//! ```

mod envelope;
mod request;

pub use envelope::Paginated;
pub use request::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest, PageRequestError};
