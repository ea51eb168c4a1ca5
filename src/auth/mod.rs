//! Authentication module
//!
//! The API issues bearer tokens from `POST /authenticate`. The
//! [`TokenManager`] holds the credentials, caches the token for a fixed
//! TTL and refreshes it at most once at a time.
//!
//! Token lifecycle: no token → authenticated → (TTL elapsed, credentials
//! changed or explicit invalidation) → no token, for as long as the client
//! lives.

mod manager;
mod types;

pub use manager::{TokenManager, AUTHENTICATE_PATH, DEFAULT_TOKEN_TTL};
pub use types::{CachedToken, Credentials, Secret};
