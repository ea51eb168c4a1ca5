//! Batch queue and chunked execution
//!
//! A [`Batch`] collects operations. [`Batch::execute`] moves the whole queue
//! into a [`BatchExecution`], which dispatches it one window ("chunk") at a
//! time: every operation of a chunk is sent concurrently, the chunk is
//! awaited as a unit, and only then are its decoded results handed out, in
//! enqueue order. The next chunk is not started until the caller asks for a
//! result past the end of the current one.
//!
//! Dropping a `BatchExecution` early stops dispatch at the next chunk
//! boundary. Requests of chunks already dispatched have been sent and are
//! not undone; operations that were never dispatched are discarded.

use super::types::{BatchOptions, PendingOperation};
use crate::client::Client;
use crate::error::Result;
use crate::http::RequestOptions;
use crate::types::{JsonValue, Method};
use futures::future::try_join_all;
use futures::Stream;
use std::collections::VecDeque;
use std::fmt::Display;
use tracing::debug;

/// Ordered, single-use queue of pending operations
pub struct Batch<'a> {
    client: &'a Client,
    queue: VecDeque<PendingOperation>,
    options: BatchOptions,
}

impl<'a> Batch<'a> {
    /// Create an empty batch bound to `client`
    pub fn new(client: &'a Client, options: BatchOptions) -> Self {
        Self {
            client,
            queue: VecDeque::new(),
            options,
        }
    }

    /// Append an operation
    pub fn enqueue(&mut self, operation: PendingOperation) -> &mut Self {
        self.queue.push_back(operation);
        self
    }

    /// Queue a GET
    pub fn get(&mut self, path: impl Into<String>, options: RequestOptions) -> &mut Self {
        self.enqueue(PendingOperation::new(Method::GET, path, options))
    }

    /// Queue a GET of `path/id`
    pub fn get_item(&mut self, path: &str, id: impl Display, options: RequestOptions) -> &mut Self {
        self.enqueue(PendingOperation::item(path, id, options))
    }

    /// Queue a POST
    pub fn post(
        &mut self,
        path: impl Into<String>,
        body: JsonValue,
        options: RequestOptions,
    ) -> &mut Self {
        self.enqueue(PendingOperation::new(Method::POST, path, options).with_payload(body))
    }

    /// Queue a PUT
    pub fn put(
        &mut self,
        path: impl Into<String>,
        body: JsonValue,
        options: RequestOptions,
    ) -> &mut Self {
        self.enqueue(PendingOperation::new(Method::PUT, path, options).with_payload(body))
    }

    /// Queue a PATCH
    pub fn patch(
        &mut self,
        path: impl Into<String>,
        body: JsonValue,
        options: RequestOptions,
    ) -> &mut Self {
        self.enqueue(PendingOperation::new(Method::PATCH, path, options).with_payload(body))
    }

    /// Queue a DELETE
    pub fn delete(&mut self, path: impl Into<String>, options: RequestOptions) -> &mut Self {
        self.enqueue(PendingOperation::new(Method::DELETE, path, options))
    }

    /// Queue an operation by verb name.
    ///
    /// Fails with a client error if `method` is not one of GET, POST, PUT,
    /// PATCH or DELETE. `payload` is ignored for verbs without a body.
    pub fn push(
        &mut self,
        method: &str,
        path: impl Into<String>,
        payload: Option<JsonValue>,
        options: RequestOptions,
    ) -> Result<&mut Self> {
        let method: Method = method.parse()?;
        let mut operation = PendingOperation::new(method, path, options);
        if method.has_body() {
            operation.payload = payload;
        }
        Ok(self.enqueue(operation))
    }

    /// Number of queued operations
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued operations in order
    pub fn operations(&self) -> impl Iterator<Item = &PendingOperation> {
        self.queue.iter()
    }

    /// Batch options
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Effective window size
    pub fn max_concurrent_requests(&self) -> usize {
        self.options
            .max_concurrent_requests
            .unwrap_or_else(|| self.client.max_concurrent_requests())
            .max(1)
    }

    /// Take the queued operations and start draining them.
    ///
    /// The batch is empty afterwards and can be refilled; operations already
    /// taken are never replayed.
    pub fn execute(&mut self) -> BatchExecution<'a> {
        BatchExecution {
            client: self.client,
            chunk_size: self.max_concurrent_requests(),
            pending: std::mem::take(&mut self.queue),
            ready: VecDeque::new(),
            chunks_dispatched: 0,
            failed: false,
        }
    }
}

impl std::fmt::Debug for Batch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("queue", &self.queue)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Pull-based sequence of decoded batch results
pub struct BatchExecution<'a> {
    client: &'a Client,
    pending: VecDeque<PendingOperation>,
    ready: VecDeque<JsonValue>,
    chunk_size: usize,
    chunks_dispatched: usize,
    failed: bool,
}

impl<'a> BatchExecution<'a> {
    /// Next decoded result, dispatching the next chunk when the current one
    /// is exhausted.
    ///
    /// A failure anywhere in a chunk is returned once, in place of that
    /// chunk's results, and ends the execution.
    pub async fn next(&mut self) -> Option<Result<JsonValue>> {
        if let Some(value) = self.ready.pop_front() {
            return Some(Ok(value));
        }
        if self.failed || self.pending.is_empty() {
            return None;
        }

        match self.dispatch_chunk().await {
            Ok(()) => self.ready.pop_front().map(Ok),
            Err(e) => {
                self.failed = true;
                self.pending.clear();
                Some(Err(e))
            }
        }
    }

    async fn dispatch_chunk(&mut self) -> Result<()> {
        let size = self.chunk_size.min(self.pending.len());
        let chunk: Vec<PendingOperation> = self.pending.drain(..size).collect();
        self.chunks_dispatched += 1;
        debug!(
            "Dispatching batch chunk {} ({} requests, {} left)",
            self.chunks_dispatched,
            size,
            self.pending.len()
        );

        let client = self.client;
        let responses = try_join_all(chunk.into_iter().map(|op| op.dispatch(client))).await?;

        let decoded = responses
            .iter()
            .map(Client::decode_result)
            .collect::<Result<Vec<_>>>()?;
        self.ready.extend(decoded);

        Ok(())
    }

    /// Operations not yet dispatched
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Chunks dispatched so far
    pub fn chunks_dispatched(&self) -> usize {
        self.chunks_dispatched
    }

    /// Window size used by this execution
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Drain everything, stopping at the first failure
    pub async fn collect_all(mut self) -> Result<Vec<JsonValue>> {
        let mut results = Vec::new();
        while let Some(item) = self.next().await {
            results.push(item?);
        }
        Ok(results)
    }

    /// Adapt into a `futures::Stream`
    pub fn into_stream(self) -> impl Stream<Item = Result<JsonValue>> + 'a {
        futures::stream::unfold(self, |mut execution| async move {
            execution.next().await.map(|item| (item, execution))
        })
    }
}

impl std::fmt::Debug for BatchExecution<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchExecution")
            .field("remaining", &self.pending.len())
            .field("buffered", &self.ready.len())
            .field("chunk_size", &self.chunk_size)
            .field("chunks_dispatched", &self.chunks_dispatched)
            .finish_non_exhaustive()
    }
}

