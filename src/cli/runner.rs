//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::RequestOptions;
use crate::types::{JsonObject, JsonValue};
use serde_json::json;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = self.build_client()?;

        match &self.cli.command {
            Commands::Get { path } => self.get(&client, path).await,
            Commands::Item { path, id } => self.item(&client, path, id).await,
            Commands::Search {
                path,
                filters,
                page,
                limit,
            } => self.search(&client, path, filters, *page, *limit).await,
            Commands::Count { path, filters } => self.count(&client, path, filters).await,
        }
    }

    /// Load configuration from the file given with `--config`, or the environment
    fn load_config(&self) -> Result<ClientConfig> {
        match &self.cli.config {
            Some(path) => {
                debug!("Loading client config from {}", path.display());
                ClientConfig::from_file(path)
            }
            None => ClientConfig::from_env(),
        }
    }

    fn build_client(&self) -> Result<Client> {
        let config = self.load_config()?;
        info!("Using API at {} as {}", config.base_url, config.username);
        Client::from_config(&config)
    }

    async fn get(&self, client: &Client, path: &str) -> Result<()> {
        client.get(path, RequestOptions::new()).await?;
        self.output(&client.result()?);
        Ok(())
    }

    async fn item(&self, client: &Client, path: &str, id: &str) -> Result<()> {
        client.get_item(path, id, RequestOptions::new()).await?;
        self.output(&client.result()?);
        Ok(())
    }

    async fn search(
        &self,
        client: &Client,
        path: &str,
        filters: &[String],
        page: u32,
        limit: Option<usize>,
    ) -> Result<()> {
        let mut search = client.search(path, parse_filters(filters)?, RequestOptions::new());
        search.set_page(page)?;

        let mut results = search.iterate(RequestOptions::new()).await?;
        let mut emitted = 0usize;
        while limit.map_or(true, |max| emitted < max) {
            let Some(record) = results.next().await else {
                break;
            };
            self.output(&record?);
            emitted += 1;
        }

        debug!("Emitted {} records from {}", emitted, path);
        Ok(())
    }

    async fn count(&self, client: &Client, path: &str, filters: &[String]) -> Result<()> {
        let search = client.search(path, parse_filters(filters)?, RequestOptions::new());
        let envelope = search.result(RequestOptions::new()).await?;
        let total_pages = envelope.total_pages()?;

        self.output(&json!({
            "path": path,
            "totalItems": envelope.total_items,
            "totalPages": total_pages,
        }));
        Ok(())
    }

    /// Output a value
    fn output(&self, value: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(value).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
        }
    }
}

/// Parse a `key=value` filter argument.
///
/// Values that parse as JSON (numbers, booleans, arrays) keep their type;
/// anything else is a string.
pub fn parse_filter(arg: &str) -> Result<(String, JsonValue)> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| Error::invalid_argument(format!("Filter '{arg}' is not key=value")))?;
    if key.is_empty() {
        return Err(Error::invalid_argument(format!("Filter '{arg}' has no key")));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn parse_filters(args: &[String]) -> Result<JsonObject> {
    args.iter().map(|arg| parse_filter(arg)).collect()
}
