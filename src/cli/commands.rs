//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Geocoding ETL pipeline CLI
#[derive(Parser, Debug)]
#[command(name = "geocode-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML)
    #[arg(short, long, global = true, default_value = "config/pipeline.yaml")]
    pub config: PathBuf,

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
    /// Run extract, transform and load in order
    Run,

    /// Download the address export
    Extract {
        /// Source URL (overrides `remote_url`)
        #[arg(long)]
        url: Option<String>,
    },

    /// Geocode the downloaded export
    Transform,

    /// Load the geocoded CSV into the feature store
    Load {
        /// Dataset name (overrides `dataset_name`)
        #[arg(long)]
        dataset: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
