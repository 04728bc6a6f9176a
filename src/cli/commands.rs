//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Incremental pagination CLI
#[derive(Parser, Debug)]
#[command(name = "pageloader")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Loader configuration file (YAML)
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
    /// Page through an endpoint, printing every item
    Fetch {
        /// Endpoint URL (overrides the config file)
        #[arg(long)]
        url: Option<String>,

        /// Addressing strategy: key, offset or page_number
        #[arg(long)]
        strategy: Option<String>,

        /// Items per page
        #[arg(long)]
        page_limit: Option<u32>,

        /// Dot path to the records array in each response
        #[arg(long)]
        records_path: Option<String>,

        /// Initial continuation key (key strategy)
        #[arg(long)]
        initial_key: Option<String>,

        /// Dot path to the next continuation key in each response (key strategy)
        #[arg(long)]
        next_key_path: Option<String>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Rows visible in the simulated viewport
        #[arg(long, default_value = "10")]
        viewport: usize,
    },

    /// Validate a loader configuration file
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one item per line)
    Json,
    /// Human-readable output
    Pretty,
}
