//! Batch module
//!
//! Queues heterogeneous requests and drains them in bounded-concurrency
//! chunks while keeping results in enqueue order.
//!
//! ```rust,ignore
//! let mut batch = client.batch_with_options(BatchOptions::new().max_concurrent_requests(10));
//! for id in 1..=100 {
//!     batch.get_item("/books", id, RequestOptions::new());
//! }
//! let mut results = batch.execute();
//! while let Some(book) = results.next().await {
//!     println!("{}", book?["title"]);
//! }
//! ```

mod executor;
mod types;

pub use executor::{Batch, BatchExecution};
pub use types::{BatchOptions, PendingOperation};
