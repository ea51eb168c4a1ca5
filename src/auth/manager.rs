//! Token manager implementation
//!
//! Caches the bearer token obtained from `POST /authenticate` and decides
//! when a new one is needed.

use super::types::{CachedToken, Credentials, Secret};
use crate::error::{Error, Result, ResultExt};
use crate::http::{RequestOptions, Transport};
use crate::types::Method;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Path of the authentication endpoint
pub const AUTHENTICATE_PATH: &str = "/authenticate";

/// How long a freshly issued token is considered usable
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

struct TokenState {
    credentials: Credentials,
    cached: Option<CachedToken>,
    /// Error of the most recent authentication attempt, if it failed
    last_failure: Option<String>,
}

/// Owns credentials and the current bearer token.
///
/// The cached token and the credentials share one lock. A refresh holds the
/// write half for the whole authentication call, so concurrent callers that
/// find the token missing or expired queue behind it and reuse its result
/// instead of authenticating again. Callers that queued behind a failed
/// attempt receive that attempt's error rather than retrying it.
pub struct TokenManager {
    state: RwLock<TokenState>,
    /// Completed authentication attempts, successful or not
    attempts: AtomicU64,
    ttl: Duration,
}

impl TokenManager {
    /// Create a token manager with the default TTL
    pub fn new(credentials: Credentials) -> Self {
        Self::with_ttl(credentials, DEFAULT_TOKEN_TTL)
    }

    /// Create a token manager with a custom TTL
    pub fn with_ttl(credentials: Credentials, ttl: Duration) -> Self {
        Self {
            state: RwLock::new(TokenState {
                credentials,
                cached: None,
                last_failure: None,
            }),
            attempts: AtomicU64::new(0),
            ttl,
        }
    }

    /// Return a usable token, authenticating through `transport` if needed.
    ///
    /// Fails with a request error when the authentication call cannot be
    /// sent, returns a non-2xx status, or its body has no `token` field.
    /// Nothing is cached on failure.
    pub async fn ensure_token(&self, transport: &dyn Transport) -> Result<String> {
        let seen = self.attempts.load(Ordering::Acquire);
        {
            let state = self.state.read().await;
            if let Some(token) = state.cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut state = self.state.write().await;

        // Another task may have refreshed while we waited for the lock
        if let Some(token) = state.cached.as_ref() {
            if !token.is_expired() {
                debug!("Reusing token refreshed by a concurrent request");
                return Ok(token.token.clone());
            }
        }
        if self.attempts.load(Ordering::Acquire) != seen {
            if let Some(failure) = &state.last_failure {
                debug!("Sharing failed authentication with a concurrent request");
                return Err(Error::request(failure.clone()));
            }
        }

        state.cached = None;
        let outcome = self.authenticate(&state.credentials, transport).await;
        self.attempts.fetch_add(1, Ordering::AcqRel);

        match outcome {
            Ok(token) => {
                info!(
                    "Authenticated as '{}', token valid until {}",
                    state.credentials.username, token.expires_at
                );
                let value = token.token.clone();
                state.cached = Some(token);
                state.last_failure = None;
                Ok(value)
            }
            Err(e) => {
                state.last_failure = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn authenticate(
        &self,
        credentials: &Credentials,
        transport: &dyn Transport,
    ) -> Result<CachedToken> {
        let options = RequestOptions::new().json(credentials.auth_body());
        let response = transport
            .send(Method::POST, AUTHENTICATE_PATH, &options)
            .await
            .context("Authentication request failed")?;

        let body: AuthResponse = response
            .json()
            .context("Authentication response rejected")?;

        Ok(CachedToken::expires_in(body.token, self.ttl))
    }

    /// Drop the cached token. Idempotent.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.cached = None;
        state.last_failure = None;
    }

    /// Current token, if one is cached (it may be expired)
    pub async fn token(&self) -> Option<String> {
        let state = self.state.read().await;
        state.cached.as_ref().map(|t| t.token.clone())
    }

    /// Expiry of the cached token, if any
    pub async fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        let state = self.state.read().await;
        state.cached.as_ref().map(|t| t.expires_at)
    }

    /// Current username
    pub async fn username(&self) -> String {
        self.state.read().await.credentials.username.clone()
    }

    /// Current credentials
    pub async fn credentials(&self) -> Credentials {
        self.state.read().await.credentials.clone()
    }

    /// Change the username; drops the token if it differs
    pub async fn set_username(&self, username: impl Into<String>) {
        let username = username.into();
        let mut state = self.state.write().await;
        if state.credentials.username != username {
            state.cached = None;
            state.last_failure = None;
            state.credentials.username = username;
        }
    }

    /// Change the password; drops the token if it differs.
    ///
    /// Switches API-key credentials over to password credentials.
    pub async fn set_password(&self, password: impl Into<String>) {
        let secret = Secret::Password(password.into());
        let mut state = self.state.write().await;
        if state.credentials.secret != secret {
            state.cached = None;
            state.last_failure = None;
            state.credentials.secret = secret;
        }
    }

    /// Replace both credential fields; drops the token if anything changed
    pub async fn set_credentials(&self, credentials: Credentials) {
        let mut state = self.state.write().await;
        if state.credentials != credentials {
            state.cached = None;
            state.last_failure = None;
            state.credentials = credentials;
        }
    }

    /// Token lifetime applied to newly issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Change the lifetime applied to tokens issued from now on
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Body of a successful authentication response
#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
}
