//! Error types for hydra-client
//!
//! Every public operation returns `Result<T, Error>`. Variants are grouped
//! into four kinds (see [`ErrorKind`]) so callers can branch on what went
//! wrong without matching every variant:
//!
//! - `Client`: local misuse, e.g. reading a response before any request
//! - `Request`: transport failures, non-2xx statuses and undecodable bodies
//! - `InvalidArgument`: a bad value passed to a query mutator
//! - `Config`: configuration that cannot be loaded or is inconsistent

use thiserror::Error;

/// Boxed cause carried by request errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for hydra-client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Client (caller misuse)
    // ============================================================================
    #[error("Client error: {message}")]
    Client { message: String },

    #[error("Unsupported method: {method}")]
    UnsupportedMethod { method: String },

    // ============================================================================
    // Request (transport, status, decoding)
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed: {message}")]
    Request {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Failed to decode response: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // ============================================================================
    // Invalid arguments
    // ============================================================================
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    // ============================================================================
    // Configuration
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller used the API incorrectly
    Client,
    /// The request could not be completed or its response not decoded
    Request,
    /// An argument was out of range
    InvalidArgument,
    /// Configuration could not be loaded or validated
    Config,
}

impl Error {
    /// Create a client (misuse) error
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
        }
    }

    /// Create an unsupported method error
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create a request error without an underlying cause
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
            source: None,
        }
    }

    /// Create a request error wrapping the transport's own error
    pub fn request_with_source(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Request {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Client { .. } | Error::UnsupportedMethod { .. } => ErrorKind::Client,
            Error::Http(_)
            | Error::Request { .. }
            | Error::HttpStatus { .. }
            | Error::Decode { .. } => ErrorKind::Request,
            Error::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::YamlParse(_)
            | Error::InvalidUrl(_)
            | Error::Io(_) => ErrorKind::Config,
        }
    }

    /// Check if this is a client (misuse) error
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Client
    }

    /// Check if this is a request error
    pub fn is_request_error(&self) -> bool {
        self.kind() == ErrorKind::Request
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }

    /// HTTP status of the response that caused this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode {
            message: e.to_string(),
            source: Some(e),
        }
    }
}

/// Result type alias for hydra-client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Prefix the error message with `message`, keeping the error kind
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            let message = format!("{}: {}", message.into(), inner);
            match inner.kind() {
                ErrorKind::Client => Error::client(message),
                ErrorKind::Request => Error::request_with_source(message, inner),
                ErrorKind::InvalidArgument => Error::invalid_argument(message),
                ErrorKind::Config => Error::config(message),
            }
        })
    }
}
