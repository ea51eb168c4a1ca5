//! CLI module
//!
//! Command-line interface over the client.
//!
//! # Commands
//!
//! - `get` - Fetch a path and print the decoded body
//! - `item` - Fetch a single resource by identifier
//! - `search` - Stream every record of a collection
//! - `count` - Print item and page totals of a collection

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{parse_filter, Runner};
