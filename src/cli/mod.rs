//! CLI module
//!
//! Command-line interface for running the pipeline.
//!
//! # Commands
//!
//! - `run` - Extract, transform and load in order
//! - `extract` - Download the address export
//! - `transform` - Geocode the downloaded export
//! - `load` - Load geocoded points into the feature store
//! - `validate` - Check the configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
