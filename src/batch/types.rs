//! Batch operation types

use crate::client::{item_path, Client};
use crate::error::Result;
use crate::http::{RequestOptions, Response};
use crate::types::{JsonValue, Method};
use std::fmt::Display;

/// Options for a single batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Window size; falls back to the client's default when unset
    pub max_concurrent_requests: Option<usize>,
}

impl BatchOptions {
    /// Create default batch options
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the window size for this batch
    #[must_use]
    pub fn max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = Some(max);
        self
    }
}

/// One queued HTTP call
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation {
    /// HTTP method
    pub method: Method,
    /// Request path, item identifier already appended
    pub path: String,
    /// JSON body for write verbs
    pub payload: Option<JsonValue>,
    /// Per-call options
    pub options: RequestOptions,
}

impl PendingOperation {
    /// Create an operation without a body
    pub fn new(method: Method, path: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            method,
            path: path.into(),
            payload: None,
            options,
        }
    }

    /// Create a single-item GET operation
    pub fn item(path: &str, id: impl Display, options: RequestOptions) -> Self {
        Self::new(Method::GET, item_path(path, id), options)
    }

    /// Attach a JSON body
    #[must_use]
    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Send this operation through `client`
    pub(crate) async fn dispatch(self, client: &Client) -> Result<Response> {
        let options = match self.payload {
            Some(body) => self.options.json(body),
            None => self.options,
        };
        client.request(self.method, &self.path, options).await
    }
}
