// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # geocode-etl
//!
//! Downloads a published spreadsheet of street addresses, geocodes each one
//! and loads the matches as a named point dataset.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geocode_etl::{load_config, GeocodingPipeline, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = load_config("config/pipeline.yaml")?;
//!     let pipeline = GeocodingPipeline::new(config)?;
//!
//!     let report = pipeline.process().await?;
//!     println!("{}", report.summary);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ AddressExtractor │──▶│  AddressGeocoder │──▶│  FeatureLoader   │
//! │  GET export CSV  │   │  Street Address  │   │  X,Y,Type CSV    │
//! │  atomic write    │   │  → Geocoder      │   │  → DuckDB table  │
//! │                  │   │  → X,Y,Type CSV  │   │  → Parquet file  │
//! └──────────────────┘   └────────┬─────────┘   └──────────────────┘
//!                                 │
//!                      ┌──────────┴──────────┐
//!                      │ Nominatim │ Census  │
//!                      └─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and CSV layout constants
pub mod types;

/// Pipeline configuration
pub mod config;

/// Template interpolation
pub mod template;

/// HTTP client with timeouts and rate limiting
pub mod http;

/// Spreadsheet export download
pub mod extract;

/// Geocoding service clients
pub mod geocode;

/// Address CSV → geocoded CSV
pub mod transform;

/// Point feature stores
pub mod load;

/// Stage sequencing
pub mod pipeline;

/// Subscriber setup
pub mod logging;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, load_config_from_str, PipelineConfig};
pub use pipeline::{GeocodingPipeline, PipelineReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
