//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};

/// dpsearch: inspect configuration, composed queries and spelling suggestions.
#[derive(Parser, Debug)]
#[command(name = "dpsearch", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "DPSEARCH_CONFIG")]
    pub config: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configuration file operations
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print the content search request composed for a term
    Query(QueryArgs),

    /// Run a combined search over documents loaded from a JSON file
    Search {
        /// Search parameters
        #[command(flatten)]
        query: QueryArgs,

        /// JSON array of `{"id", "type", "source"}` documents
        #[arg(short, long)]
        documents: String,
    },

    /// Suggest spelling corrections for search terms
    Spell {
        /// Terms to check
        #[arg(required = true)]
        terms: Vec<String>,

        /// Word vectors in fastText `.vec` format (overrides `model.vectors_path`)
        #[arg(long)]
        vectors: Option<String>,
    },
}

/// Search parameters shared by `query` and `search`.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Search term
    pub term: String,

    /// 1-based page
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub page: i64,

    /// Results per page
    #[arg(short, long)]
    pub size: Option<u64>,

    /// Sort order (relevance, release_date_desc, release_date_asc, title_asc, title_desc, first_letter)
    #[arg(long, default_value = "relevance")]
    pub sort: String,

    /// Type filter name; repeat for several
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Listing the search runs for (ons, onsdata, onspublications)
    #[arg(long, default_value = "ons")]
    pub list_type: String,
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,

    /// Get a value by dotted key, e.g. `search.results_per_page`
    Get {
        /// Dotted key
        key: String,
    },

    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },

    /// Write a default config file
    Init {
        /// Target file (defaults to the platform config dir)
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration as TOML
    Show,
}
