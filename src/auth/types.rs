//! Credential and token types

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;

/// Secret half of a credential pair
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    /// Account password
    Password(String),
    /// API key issued for the account
    ApiKey(String),
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Secret::Password(_) => f.write_str("Password(***)"),
            Secret::ApiKey(_) => f.write_str("ApiKey(***)"),
        }
    }
}

/// Identity presented to the authentication endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Password or API key
    pub secret: Secret,
}

impl Credentials {
    /// Username/password credentials
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: Secret::Password(password.into()),
        }
    }

    /// Username/API key credentials
    pub fn api_key(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: Secret::ApiKey(api_key.into()),
        }
    }

    /// JSON body sent to the authentication endpoint
    pub fn auth_body(&self) -> Value {
        match &self.secret {
            Secret::Password(password) => json!({
                "username": self.username,
                "password": password,
            }),
            Secret::ApiKey(key) => json!({
                "username": self.username,
                "apiKey": key,
            }),
        }
    }
}

/// Cached bearer token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The bearer token
    pub token: String,
    /// When the token stops being usable
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires `ttl` from now
    pub fn expires_in(token: String, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { token, expires_at }
    }

    /// A token is usable strictly before its expiry instant
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_cached_token_not_expired() {
        let token = CachedToken::expires_in("test".to_string(), Duration::from_secs(3600));
        assert!(!token.is_expired());
    }

    #[test]
    fn test_cached_token_expired() {
        let token = CachedToken::new(
            "test".to_string(),
            Utc::now() - chrono::Duration::seconds(1),
        );
        assert!(token.is_expired());
    }

    #[test]
    fn test_cached_token_zero_ttl_is_expired() {
        let token = CachedToken::expires_in("test".to_string(), Duration::ZERO);
        assert!(token.is_expired());
    }

    #[test]
    fn test_auth_body_password() {
        let creds = Credentials::password("alice", "s3cret");
        assert_eq!(
            creds.auth_body(),
            json!({"username": "alice", "password": "s3cret"})
        );
    }

    #[test]
    fn test_auth_body_api_key() {
        let creds = Credentials::api_key("alice", "key-123");
        assert_eq!(
            creds.auth_body(),
            json!({"username": "alice", "apiKey": "key-123"})
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::password("alice", "s3cret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cret"));
    }
}
