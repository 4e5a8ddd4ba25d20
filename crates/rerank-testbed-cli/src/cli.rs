use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "rerank-testbed",
    version,
    about = "Submit queries to a search-and-rerank API and compare the orderings"
)]
pub struct Cli {
    /// Base URL of the search API; overrides the saved setting
    #[arg(long, global = true, env = "RERANK_TESTBED_API_BASE")]
    pub api_base: Option<String>,

    /// Settings file (default: ~/.rerank-testbed/settings.json)
    #[arg(long, global = true, env = "RERANK_TESTBED_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Per-request timeout in milliseconds
    #[arg(
        long,
        global = true,
        env = "RERANK_TESTBED_TIMEOUT_MS",
        default_value_t = 15_000
    )]
    pub timeout_ms: u64,

    /// Print a JSON report instead of the table
    #[arg(long, global = true)]
    pub json: bool,

    /// Neither read nor write the settings file
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch items for a query (POST /search/parse)
    Parse {
        #[arg(short = 'q', long = "query")]
        query: String,
    },
    /// Rerank items from a file, or parse first and rerank the result
    Rerank {
        #[arg(short = 'q', long = "query")]
        query: String,
        /// JSON file holding an item array or an object with `items`
        #[arg(long)]
        items: Option<PathBuf>,
    },
    /// Parse and rerank in one call (POST /search)
    Search {
        #[arg(short = 'q', long = "query")]
        query: String,
    },
    /// Inspect or change saved settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective API base and where it came from
    Show,
    /// Save a new API base
    SetApiBase { url: String },
    /// Forget saved settings
    Reset,
}
