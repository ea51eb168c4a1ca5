//! Filtered collection search and lazy record iteration

use super::envelope::{into_members, CollectionEnvelope};
use super::filters::set_nested_value;
use crate::batch::BatchExecution;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::http::{RequestOptions, Response};
use crate::types::{JsonObject, JsonValue};
use futures::Stream;
use std::collections::VecDeque;
use tracing::debug;

/// Query state for one collection: path, filters, page cursor and options.
///
/// Mutators only change local state; nothing is sent until
/// [`execute`](Self::execute), [`result`](Self::result) or
/// [`iterate`](Self::iterate) is called.
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    client: &'a Client,
    path: String,
    filters: JsonObject,
    page: u32,
    options: RequestOptions,
}

impl<'a> SearchRequest<'a> {
    /// Create a search starting at page 1
    pub fn new(
        client: &'a Client,
        path: impl Into<String>,
        filters: JsonObject,
        options: RequestOptions,
    ) -> Self {
        let mut search = Self {
            client,
            path: path.into(),
            filters: JsonObject::new(),
            page: 1,
            options,
        };
        search.set_filters(filters);
        search
    }

    /// Collection path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Point the search at another collection
    pub fn set_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = path.into();
        self
    }

    /// Current filters, nested
    pub fn filters(&self) -> &JsonObject {
        &self.filters
    }

    /// Replace all filters. Dotted or bracketed names are nested.
    pub fn set_filters(&mut self, filters: JsonObject) -> &mut Self {
        self.filters = JsonObject::new();
        for (name, value) in filters {
            self.set_filter(&name, value);
        }
        self
    }

    /// Set one filter; `"author.name"` nests as `{"author": {"name": ..}}`
    pub fn set_filter(&mut self, name: &str, value: impl Into<JsonValue>) -> &mut Self {
        let filters = std::mem::take(&mut self.filters);
        self.filters = set_nested_value(filters, name, value.into());
        self
    }

    /// Current page cursor, starting at 1
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Move the cursor to `page`; fails with `InvalidArgument` below 1
    pub fn set_page(&mut self, page: u32) -> Result<&mut Self> {
        if page < 1 {
            return Err(Error::invalid_argument(format!(
                "page must be greater than 0, got {page}"
            )));
        }
        self.page = page;
        Ok(self)
    }

    /// Reset the cursor to page 1
    pub fn set_first_page(&mut self) -> &mut Self {
        self.page = 1;
        self
    }

    /// Advance the cursor by one page
    pub fn set_next_page(&mut self) -> &mut Self {
        self.page = self.page.saturating_add(1);
        self
    }

    /// Options stored with the search
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Replace the stored options
    pub fn set_options(&mut self, options: RequestOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Options for one page request.
    ///
    /// Stored options sit under the ad-hoc `options`. The query is the
    /// merged `query` maps overlaid with the filters (filters win on
    /// top-level keys), with `page` set last.
    fn page_options(&self, options: &RequestOptions, page: u32) -> RequestOptions {
        let mut merged = self.options.merged_with(options);
        merged
            .query
            .extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.query.insert("page".to_string(), page.into());
        merged
    }

    /// Fetch the current page
    pub async fn execute(&self, options: RequestOptions) -> Result<Response> {
        let options = self.page_options(&options, self.page);
        self.client.get(&self.path, options).await
    }

    /// Fetch and decode the current page
    pub async fn result(&self, options: RequestOptions) -> Result<CollectionEnvelope> {
        self.execute(options).await?.json()
    }

    /// Total items reported by the collection
    pub async fn total_items(&self) -> Result<u64> {
        Ok(self.result(RequestOptions::new()).await?.total_items)
    }

    /// Number of pages reported by the collection
    pub async fn total_pages(&self) -> Result<u32> {
        self.result(RequestOptions::new()).await?.total_pages()
    }

    /// Records of a decoded page value
    pub fn members_of(page: &JsonValue) -> Vec<JsonValue> {
        into_members(page.clone())
    }

    /// Walk every record from the current page to the last one.
    ///
    /// The current page is fetched first to discover the page count; its
    /// records are yielded first. The remaining pages go through a batch
    /// using the client's window size and are fetched chunk by chunk as the
    /// returned [`SearchResults`] is consumed.
    pub async fn iterate(&self, options: RequestOptions) -> Result<SearchResults<'a>> {
        let first = self.result(options.clone()).await?;
        let total_pages = first.total_pages()?;

        let mut batch = self.client.batch();
        let mut next_page = self.page.saturating_add(1);
        while next_page <= total_pages {
            batch.get(self.path.clone(), self.page_options(&options, next_page));
            next_page += 1;
        }
        debug!(
            "Iterating {} from page {} of {} ({} pages queued)",
            self.path,
            self.page,
            total_pages,
            batch.len()
        );

        Ok(SearchResults {
            buffer: first.members.into(),
            pages: batch.execute(),
            total_pages,
            finished: false,
        })
    }
}

/// Lazy, single-pass sequence of collection records
pub struct SearchResults<'a> {
    buffer: VecDeque<JsonValue>,
    pages: BatchExecution<'a>,
    total_pages: u32,
    finished: bool,
}

impl<'a> SearchResults<'a> {
    /// Next record, fetching the next chunk of pages when needed.
    ///
    /// A page that fails to load or to decode as a collection is returned
    /// once as an error and ends the iteration.
    pub async fn next(&mut self) -> Option<Result<JsonValue>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }
            if self.finished {
                return None;
            }
            let page = match self.pages.next().await? {
                Ok(page) => serde_json::from_value::<CollectionEnvelope>(page),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };
            match page {
                Ok(page) => self.buffer.extend(page.members),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }

    /// Page count discovered from the first page
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Drain every record, stopping at the first failure
    pub async fn collect_all(mut self) -> Result<Vec<JsonValue>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await {
            records.push(record?);
        }
        Ok(records)
    }

    /// Adapt into a `futures::Stream`
    pub fn into_stream(self) -> impl Stream<Item = Result<JsonValue>> + 'a {
        futures::stream::unfold(self, |mut results| async move {
            results.next().await.map(|item| (item, results))
        })
    }
}

impl std::fmt::Debug for SearchResults<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchResults")
            .field("buffered", &self.buffer.len())
            .field("pages", &self.pages)
            .field("total_pages", &self.total_pages)
            .field("finished", &self.finished)
            .finish()
    }
}
