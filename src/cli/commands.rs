//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hydra API client CLI
#[derive(Parser, Debug)]
#[command(name = "hydra-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML); HYDRA_API_* variables are used when absent
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// GET a path and print the decoded body
    Get {
        /// Path relative to the API root
        path: String,
    },

    /// GET a single resource at <path>/<id>
    Item {
        /// Collection path
        path: String,

        /// Resource identifier
        id: String,
    },

    /// Print every record of a collection, one per line
    Search {
        /// Collection path
        path: String,

        /// Filter as key=value; dotted keys nest (author.name=Doe)
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Page to start from
        #[arg(long, default_value = "1")]
        page: u32,

        /// Stop after this many records
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the item and page totals of a collection
    Count {
        /// Collection path
        path: String,

        /// Filter as key=value
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Human-readable output
    Pretty,
}
