//! HTTP transport module
//!
//! Defines the [`Transport`] seam the client dispatches through, the
//! [`RequestOptions`] passed along with each request, and a reqwest-backed
//! [`HttpTransport`].
//!
//! There is no retry or backoff: a failed send surfaces to the
//! caller as a request error.

mod options;
mod transport;

pub use options::{encode_query, RequestOptions};
pub use transport::{
    HttpTransport, HttpTransportConfig, HttpTransportConfigBuilder, Response, Transport,
};

#[cfg(test)]
mod tests;
