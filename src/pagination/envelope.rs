//! Hydra collection envelope

use crate::error::{Error, Result};
use crate::types::JsonValue;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::warn;

static PAGE_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]page=(\d+)").unwrap());

/// Decoded body of a paginated collection response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionEnvelope<T = JsonValue> {
    /// Total number of items across all pages
    #[serde(rename = "hydra:totalItems", default)]
    pub total_items: u64,

    /// Pagination links
    #[serde(
        rename = "hydra:view",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub view: Option<CollectionView>,

    /// Records on this page
    #[serde(rename = "hydra:member", default = "Vec::new")]
    pub members: Vec<T>,
}

/// `hydra:view` links of a partial collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionView {
    /// URI of the first page
    #[serde(rename = "hydra:first", default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// URI of the last page; its `page` parameter is the page count
    #[serde(rename = "hydra:last", default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    /// URI of the previous page
    #[serde(rename = "hydra:previous", default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// URI of the next page
    #[serde(rename = "hydra:next", default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl<T> CollectionEnvelope<T> {
    /// URI of the last page, if the collection is paginated
    pub fn last_page_uri(&self) -> Option<&str> {
        self.view.as_ref().and_then(|v| v.last.as_deref())
    }

    /// Number of pages, read from the last page URI; 1 when absent.
    ///
    /// Fails with a decode error if the page number does not fit in a `u32`.
    pub fn total_pages(&self) -> Result<u32> {
        let Some(uri) = self.last_page_uri() else {
            return Ok(1);
        };
        match page_from_uri(uri)? {
            Some(pages) => Ok(pages),
            None => {
                warn!("No page number in last page URI '{}', assuming 1 page", uri);
                Ok(1)
            }
        }
    }
}

/// Extract the `page` query parameter from a URI.
///
/// Returns `Ok(None)` when there is no `page` parameter and a decode error
/// when its value is out of range.
pub fn page_from_uri(uri: &str) -> Result<Option<u32>> {
    let Some(digits) = PAGE_PARAM.captures(uri).and_then(|c| c.get(1)) else {
        return Ok(None);
    };
    digits
        .as_str()
        .parse::<u32>()
        .map(Some)
        .map_err(|_| Error::decode(format!("Page number out of range in '{uri}'")))
}

/// Take the `hydra:member` records out of a decoded page
pub fn into_members(page: JsonValue) -> Vec<JsonValue> {
    match page {
        JsonValue::Object(mut map) => match map.remove("hydra:member") {
            Some(JsonValue::Array(members)) => members,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
