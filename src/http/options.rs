//! Per-request options and query-string encoding
//!
//! `RequestOptions` is the options map handed to a [`Transport`](super::Transport).
//! Clients hold a set of default options and merge each call's options over
//! them before dispatch.

use crate::types::{JsonObject, JsonValue};
use std::collections::BTreeMap;
use std::time::Duration;

/// Options for a single request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Query parameters, possibly nested
    pub query: JsonObject,
    /// JSON body
    pub json: Option<JsonValue>,
    /// Override the transport timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Create empty request options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set the JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.json = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Merge `overrides` over these options.
    ///
    /// Headers and query parameters are merged key by key; on a conflict the
    /// value from `overrides` wins. `json` and `timeout` are taken from
    /// `overrides` when set there.
    pub fn merged_with(&self, overrides: &RequestOptions) -> RequestOptions {
        let mut merged = self.clone();
        merged.headers.extend(
            overrides
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        merged.query.extend(
            overrides
                .query
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        if overrides.json.is_some() {
            merged.json.clone_from(&overrides.json);
        }
        if overrides.timeout.is_some() {
            merged.timeout = overrides.timeout;
        }
        merged
    }

    /// Flatten the query map into `(key, value)` pairs
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        encode_query(&self.query)
    }
}

/// Encode a nested query map using bracket notation.
///
/// `{"author": {"name": "Doe"}}` becomes `author[name]=Doe`, scalar lists
/// become `tags[]=a&tags[]=b`, booleans are sent as `1`/`0` and nulls are
/// dropped.
pub fn encode_query(query: &JsonObject) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in query {
        encode_value(key.clone(), value, &mut pairs);
    }
    pairs
}

fn encode_value(prefix: String, value: &JsonValue, out: &mut Vec<(String, String)>) {
    match value {
        JsonValue::Null => {}
        JsonValue::Bool(b) => out.push((prefix, if *b { "1" } else { "0" }.to_string())),
        JsonValue::Number(n) => out.push((prefix, n.to_string())),
        JsonValue::String(s) => out.push((prefix, s.clone())),
        JsonValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let key = if item.is_object() || item.is_array() {
                    format!("{prefix}[{index}]")
                } else {
                    format!("{prefix}[]")
                };
                encode_value(key, item, out);
            }
        }
        JsonValue::Object(map) => {
            for (key, item) in map {
                encode_value(format!("{prefix}[{key}]"), item, out);
            }
        }
    }
}
