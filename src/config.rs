//! Client configuration
//!
//! A [`ClientConfig`] describes where the API lives, how to authenticate and
//! how requests are shaped. It is loaded from YAML or from `HYDRA_API_*`
//! environment variables and turned into a client with
//! [`Client::from_config`](crate::client::Client::from_config).

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Environment variable holding `base_url`
pub const ENV_URL: &str = "HYDRA_API_URL";
/// Environment variable holding `username`
pub const ENV_USERNAME: &str = "HYDRA_API_USERNAME";
/// Environment variable holding `password`
pub const ENV_PASSWORD: &str = "HYDRA_API_PASSWORD";
/// Environment variable holding `api_key`
pub const ENV_API_KEY: &str = "HYDRA_API_KEY";
/// Environment variable holding `token_ttl_secs`
pub const ENV_TOKEN_TTL: &str = "HYDRA_API_TOKEN_TTL";
/// Environment variable holding `max_concurrent_requests`
pub const ENV_MAX_CONCURRENT_REQUESTS: &str = "HYDRA_API_MAX_CONCURRENT_REQUESTS";

/// Connection and authentication settings for a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.example.com`
    pub base_url: String,

    /// Account name sent to the authentication endpoint
    pub username: String,

    /// Password secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// API key secret, used instead of a password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Lifetime assumed for issued tokens, in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Default batch window size
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent sent with every request; defaults to `hydra-client/<version>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Headers sent with every request
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,

    /// Query parameters sent with every request
    #[serde(default)]
    pub default_query: JsonObject,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_token_ttl() -> u64 {
    3000
}

fn default_max_concurrent_requests() -> usize {
    50
}

fn default_timeout() -> u64 {
    30
}

impl ClientConfig {
    /// Minimal configuration with a password secret
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: Some(password.into()),
            api_key: None,
            token_ttl_secs: default_token_ttl(),
            max_concurrent_requests: default_max_concurrent_requests(),
            timeout_secs: default_timeout(),
            user_agent: None,
            default_headers: BTreeMap::new(),
            default_query: JsonObject::new(),
            accept_invalid_certs: false,
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read client config '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Build from `HYDRA_API_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from a variable lookup, using the `HYDRA_API_*` names
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(ENV_URL).ok_or_else(|| Error::missing_field(ENV_URL))?;
        let username = lookup(ENV_USERNAME).ok_or_else(|| Error::missing_field(ENV_USERNAME))?;

        let mut config = Self {
            password: lookup(ENV_PASSWORD),
            api_key: lookup(ENV_API_KEY),
            ..Self::new(base_url, username, String::new())
        };
        if let Some(ttl) = lookup(ENV_TOKEN_TTL) {
            config.token_ttl_secs = parse_var(ENV_TOKEN_TTL, &ttl)?;
        }
        if let Some(max) = lookup(ENV_MAX_CONCURRENT_REQUESTS) {
            config.max_concurrent_requests = parse_var(ENV_MAX_CONCURRENT_REQUESTS, &max)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        let url = url::Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.username.is_empty() {
            return Err(Error::missing_field("username"));
        }
        match (&self.password, &self.api_key) {
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "Set either password or api_key, not both",
                ))
            }
            (None, None) => return Err(Error::missing_field("password")),
            _ => {}
        }

        if self.max_concurrent_requests == 0 {
            return Err(Error::config("max_concurrent_requests must be at least 1"));
        }

        Ok(())
    }

    /// Credentials for the token manager
    pub fn credentials(&self) -> Result<Credentials> {
        match (&self.password, &self.api_key) {
            (Some(password), None) => Ok(Credentials::password(&self.username, password)),
            (None, Some(key)) => Ok(Credentials::api_key(&self.username, key)),
            (None, None) => Err(Error::missing_field("password")),
            (Some(_), Some(_)) => Err(Error::config(
                "Set either password or api_key, not both",
            )),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("Invalid value for {name}: '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Secret;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_yaml_defaults() {
        let config = ClientConfig::from_yaml_str(
            r"
base_url: https://api.example.com
username: alice
password: s3cret
",
        )
        .unwrap();

        assert_eq!(config, ClientConfig::new("https://api.example.com", "alice", "s3cret"));
        assert_eq!(config.token_ttl_secs, 3000);
        assert_eq!(config.max_concurrent_requests, 50);
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_yaml_full() {
        let config = ClientConfig::from_yaml_str(
            r"
base_url: https://api.example.com
username: robot
api_key: k-123
token_ttl_secs: 600
max_concurrent_requests: 8
timeout_secs: 5
user_agent: books-sync/1.0
default_headers:
  Accept: application/ld+json
default_query:
  itemsPerPage: 100
accept_invalid_certs: true
",
        )
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("k-123"));
        assert_eq!(config.token_ttl_secs, 600);
        assert_eq!(config.max_concurrent_requests, 8);
        assert_eq!(config.user_agent.as_deref(), Some("books-sync/1.0"));
        assert_eq!(config.default_headers["Accept"], "application/ld+json");
        assert_eq!(config.default_query["itemsPerPage"], 100);
        assert!(config.accept_invalid_certs);

        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.username, "robot");
        assert!(matches!(credentials.secret, Secret::ApiKey(_)));
    }

    #[test]
    fn test_yaml_parse_error() {
        let err = ClientConfig::from_yaml_str("base_url: [").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = ClientConfig::new("not a url", "alice", "pw");
        assert!(matches!(config.validate().unwrap_err(), Error::InvalidUrl(_)));

        let config = ClientConfig::new("ftp://files.example.com", "alice", "pw");
        assert!(matches!(config.validate().unwrap_err(), Error::Config { .. }));
    }

    #[test]
    fn test_validate_secrets() {
        let mut config = ClientConfig::new("https://api.example.com", "alice", "pw");
        assert!(config.validate().is_ok());

        config.api_key = Some("key".to_string());
        assert!(config.validate().is_err());
        assert!(config.credentials().is_err());

        config.password = None;
        config.api_key = None;
        assert!(matches!(
            config.validate().unwrap_err(),
            Error::MissingConfigField { .. }
        ));
    }

    #[test]
    fn test_validate_concurrency() {
        let mut config = ClientConfig::new("https://api.example.com", "alice", "pw");
        config.max_concurrent_requests = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url: http://localhost:8080\nusername: alice\npassword: pw\ntimeout_secs: 3"
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));
    }

    #[test]
    fn test_from_vars() {
        let config = ClientConfig::from_vars(vars(&[
            (ENV_URL, "https://api.example.com"),
            (ENV_USERNAME, "alice"),
            (ENV_PASSWORD, "pw"),
            (ENV_TOKEN_TTL, "120"),
            (ENV_MAX_CONCURRENT_REQUESTS, "4"),
        ]))
        .unwrap();

        assert_eq!(config.password.as_deref(), Some("pw"));
        assert_eq!(config.token_ttl_secs, 120);
        assert_eq!(config.max_concurrent_requests, 4);
    }

    #[test]
    fn test_from_vars_api_key() {
        let config = ClientConfig::from_vars(vars(&[
            (ENV_URL, "https://api.example.com"),
            (ENV_USERNAME, "robot"),
            (ENV_API_KEY, "k"),
        ]))
        .unwrap();
        assert!(config.password.is_none());
        assert_eq!(config.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_from_vars_errors() {
        let err = ClientConfig::from_vars(vars(&[(ENV_USERNAME, "alice")])).unwrap_err();
        assert!(err.to_string().contains(ENV_URL));

        let err = ClientConfig::from_vars(vars(&[
            (ENV_URL, "https://api.example.com"),
            (ENV_USERNAME, "alice"),
            (ENV_PASSWORD, "pw"),
            (ENV_TOKEN_TTL, "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(ENV_TOKEN_TTL));
    }
}
