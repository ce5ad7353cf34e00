//! Error types for the geocoding pipeline
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Three variants carry the pipeline taxonomy:
//! - [`Error::ExtractionFailed`] aborts a run (no usable raw data)
//! - [`Error::Geocode`] is row-scoped and absorbed by the transform stage
//! - [`Error::FeatureCreationFailed`] surfaces from the feature store boundary

use thiserror::Error;

/// The main error type for the pipeline
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("Extraction from '{url}' failed: {message}")]
    ExtractionFailed { url: String, message: String },

    #[error("Geocoding '{address}' failed: {message}")]
    Geocode { address: String, message: String },

    #[error("Feature dataset '{dataset}' was not created: {message}")]
    FeatureCreationFailed { dataset: String, message: String },

    // ============================================================================
    // Data Errors
    // ============================================================================
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { column: String, path: String },

    #[error("Invalid coordinate '{value}': {message}")]
    InvalidCoordinate { value: String, message: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
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

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a per-row geocoding error
    pub fn geocode(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Geocode {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create a feature creation error
    pub fn feature_creation(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FeatureCreationFailed {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Create an invalid coordinate error
    pub fn invalid_coordinate(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::FileNotFound {
            path: path.as_ref().display().to_string(),
        }
    }
}

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, Error>;
