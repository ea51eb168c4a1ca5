// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # hydra-client
//!
//! Async client for JSON-LD / Hydra REST APIs that authenticate with a
//! short-lived bearer token.
//!
//! ## Features
//!
//! - **Token management**: one authentication per token lifetime, shared
//!   by every concurrent request
//! - **Requests**: GET/POST/PUT/PATCH/DELETE with merged default options
//! - **Batches**: queued requests drained in bounded-concurrency chunks,
//!   results in enqueue order
//! - **Collections**: filtered searches and lazy iteration over every
//!   `hydra:member` of a paginated collection
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hydra_client::{Client, Credentials, RequestOptions, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::create("https://api.example.com", Credentials::password("alice", "s3cret"))?;
//!
//!     client.get_item("/books", 42, RequestOptions::new()).await?;
//!     println!("{}", client.result()?);
//!
//!     let filters = json!({"author.name": "Doe"}).as_object().cloned().unwrap_or_default();
//!     let mut books = client
//!         .search("/books", filters, RequestOptions::new())
//!         .iterate(RequestOptions::new())
//!         .await?;
//!     while let Some(book) = books.next().await {
//!         println!("{}", book?["title"]);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Client                           │
//! │  request() / get() / post() ...   result()   response()  │
//! └──────────────────────────────────────────────────────────┘
//!          │                  │                    │
//! ┌────────┴───────┬──────────┴────────┬───────────┴────────┐
//! │      Auth      │       Batch       │     Pagination     │
//! ├────────────────┼───────────────────┼────────────────────┤
//! │ TokenManager   │ Batch             │ SearchRequest      │
//! │ Credentials    │ BatchExecution    │ SearchResults      │
//! │ CachedToken    │ chunked dispatch  │ CollectionEnvelope │
//! └────────────────┴───────────────────┴────────────────────┘
//!                             │
//!                  Transport (reqwest / mock)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Bearer token management
pub mod auth;

/// Transport abstraction and request options
pub mod http;

/// Authenticated request dispatcher
pub mod client;

/// Bounded-concurrency request batches
pub mod batch;

/// Collection search and iteration
pub mod pagination;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::{Credentials, TokenManager};
pub use batch::{Batch, BatchExecution, BatchOptions};
pub use client::{Client, MAX_CONCURRENT_REQUESTS};
pub use config::ClientConfig;
pub use http::{HttpTransport, HttpTransportConfig, RequestOptions, Response, Transport};
pub use pagination::{CollectionEnvelope, SearchRequest, SearchResults};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
