//! Authenticated request dispatcher
//!
//! [`Client`] issues single requests against a [`Transport`], attaching the
//! bearer token managed by its [`TokenManager`]. It is also the entry point
//! for batches ([`Client::batch`]) and collection searches
//! ([`Client::search`]).

use crate::auth::{Credentials, TokenManager};
use crate::batch::{Batch, BatchOptions};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpTransport, HttpTransportConfig, RequestOptions, Response, Transport};
use crate::pagination::SearchRequest;
use crate::types::{JsonObject, JsonValue, Method};
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Default size of a batch's concurrency window
pub const MAX_CONCURRENT_REQUESTS: usize = 50;

/// Authenticated API client
pub struct Client {
    transport: Arc<dyn Transport>,
    tokens: TokenManager,
    default_options: RequestOptions,
    max_concurrent_requests: usize,
    last_response: Mutex<Option<Response>>,
}

impl Client {
    /// Create a client over an existing transport
    pub fn new(transport: Arc<dyn Transport>, credentials: Credentials) -> Self {
        Self {
            transport,
            tokens: TokenManager::new(credentials),
            default_options: RequestOptions::default(),
            max_concurrent_requests: MAX_CONCURRENT_REQUESTS,
            last_response: Mutex::new(None),
        }
    }

    /// Create a client talking to `api_url` over the reqwest transport
    pub fn create(api_url: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let config = HttpTransportConfig::builder().base_url(api_url).build();
        let transport = HttpTransport::with_config(config)?;
        Ok(Self::new(Arc::new(transport), credentials))
    }

    /// Create a client from a validated configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = HttpTransportConfig::builder()
            .base_url(config.base_url.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .accept_invalid_certs(config.accept_invalid_certs);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let transport = HttpTransport::with_config(builder.build())?;

        let mut default_options = RequestOptions::new();
        default_options
            .headers
            .extend(config.default_headers.clone());
        default_options.query.extend(config.default_query.clone());

        Ok(Self::new(Arc::new(transport), config.credentials()?)
            .with_token_ttl(Duration::from_secs(config.token_ttl_secs))
            .with_max_concurrent_requests(config.max_concurrent_requests)
            .with_default_options(default_options))
    }

    /// Set the options every request starts from
    #[must_use]
    pub fn with_default_options(mut self, options: RequestOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Set the lifetime applied to newly issued tokens
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.tokens.set_ttl(ttl);
        self
    }

    /// Set the default batch window size (at least 1)
    #[must_use]
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max.max(1);
        self
    }

    /// Send a request with the current bearer token.
    ///
    /// `options` are merged over the client's default options; per-call
    /// values win. Fails with a request error if authentication or the
    /// transport fails. Non-2xx responses are returned, not raised; decode
    /// them with [`Client::decode_result`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        self.store_response(None);

        let token = self.tokens.ensure_token(self.transport.as_ref()).await?;
        let mut options = self.default_options.merged_with(&options);
        options
            .headers
            .insert("Authorization".to_string(), format!("Bearer {token}"));

        debug!("Dispatching {} {}", method, path);
        let response = self.transport.send(method, path, &options).await?;
        self.store_response(Some(response.clone()));

        Ok(response)
    }

    /// GET `path`
    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::GET, path, options).await
    }

    /// GET a single resource at `path/id`
    pub async fn get_item(
        &self,
        path: &str,
        id: impl Display,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(Method::GET, &item_path(path, id), options)
            .await
    }

    /// POST `body` as JSON to `path`
    pub async fn post(
        &self,
        path: &str,
        body: JsonValue,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(Method::POST, path, options.json(body)).await
    }

    /// PUT `body` as JSON to `path`
    pub async fn put(
        &self,
        path: &str,
        body: JsonValue,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(Method::PUT, path, options.json(body)).await
    }

    /// PATCH `body` as JSON to `path`
    pub async fn patch(
        &self,
        path: &str,
        body: JsonValue,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(Method::PATCH, path, options.json(body)).await
    }

    /// DELETE `path`
    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::DELETE, path, options).await
    }

    /// The most recent response.
    ///
    /// Fails with a client error if no request has completed yet, or if the
    /// last request failed before producing a response.
    pub fn response(&self) -> Result<Response> {
        self.last_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Error::client("No response found, make a request first"))
    }

    /// Decode the most recent response as JSON
    pub fn result(&self) -> Result<JsonValue> {
        Self::decode_result(&self.response()?)
    }

    /// Decode `response` as JSON.
    ///
    /// Fails with a request error for non-2xx statuses and invalid bodies.
    pub fn decode_result(response: &Response) -> Result<JsonValue> {
        response.json()
    }

    /// Start a search over the collection at `path`
    pub fn search(
        &self,
        path: impl Into<String>,
        filters: JsonObject,
        options: RequestOptions,
    ) -> SearchRequest<'_> {
        SearchRequest::new(self, path, filters, options)
    }

    /// Start an empty batch with the client's default window size
    pub fn batch(&self) -> Batch<'_> {
        self.batch_with_options(BatchOptions::default())
    }

    /// Start an empty batch with explicit options
    pub fn batch_with_options(&self, options: BatchOptions) -> Batch<'_> {
        Batch::new(self, options)
    }

    /// The token manager
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Change the username, dropping the cached token if it differs
    pub async fn set_username(&self, username: impl Into<String>) {
        self.tokens.set_username(username).await;
    }

    /// Change the password, dropping the cached token if it differs
    pub async fn set_password(&self, password: impl Into<String>) {
        self.tokens.set_password(password).await;
    }

    /// Drop the cached token
    pub async fn clear_token(&self) {
        self.tokens.invalidate().await;
    }

    /// The options every request starts from
    pub fn default_options(&self) -> &RequestOptions {
        &self.default_options
    }

    /// Replace the default options
    pub fn set_default_options(&mut self, options: RequestOptions) {
        self.default_options = options;
    }

    /// Default batch window size
    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
    }

    /// The underlying transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    fn store_response(&self, response: Option<Response>) {
        *self
            .last_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = response;
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("tokens", &self.tokens)
            .field("default_options", &self.default_options)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .finish_non_exhaustive()
    }
}

/// Join a collection path and an item identifier
pub(crate) fn item_path(path: &str, id: impl Display) -> String {
    format!("{}/{}", path.trim_end_matches('/'), id)
}
