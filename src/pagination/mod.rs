//! Pagination module
//!
//! Searches over Hydra collections: filter handling, envelope decoding and
//! lazy iteration of every record across pages.
//!
//! # Overview
//!
//! A [`SearchRequest`] holds the path, filters and page cursor of one
//! collection query. [`SearchRequest::iterate`] fetches the current page to
//! learn the page count from `hydra:view`/`hydra:last`, then fetches the
//! remaining pages through a batch and yields their `hydra:member` records
//! in page order.

mod envelope;
mod filters;
mod search;

pub use envelope::{into_members, page_from_uri, CollectionEnvelope, CollectionView};
pub use filters::set_nested_value;
pub use search::{SearchRequest, SearchResults};
