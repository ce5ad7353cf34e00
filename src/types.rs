//! Common types used throughout the pipeline
//!
//! This module contains the data model shared by the extract, transform
//! and load stages.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// CSV Layout
// ============================================================================

/// Column holding the free-text street address in the raw export
pub const STREET_ADDRESS_COLUMN: &str = "Street Address";

/// Header of the normalized output file
pub const OUTPUT_HEADER: [&str; 3] = ["X", "Y", "Type"];

/// Category label written on every geocoded row
pub const RESIDENTIAL: &str = "Residential";

/// City appended to every query when none is configured
pub const DEFAULT_CITY: &str = "Boulder";

/// State appended to every query when none is configured
pub const DEFAULT_STATE: &str = "CO";

// ============================================================================
// Raw Input
// ============================================================================

/// One row of the downloaded spreadsheet export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAddressRecord {
    /// 1-based data row number (header excluded)
    pub row: usize,
    /// Contents of the `Street Address` column
    pub street_address: String,
}

impl RawAddressRecord {
    /// Create a new raw record
    pub fn new(row: usize, street_address: impl Into<String>) -> Self {
        Self {
            row,
            street_address: street_address.into(),
        }
    }

    /// Whether the address field holds anything worth geocoding
    pub fn is_blank(&self) -> bool {
        self.street_address.trim().is_empty()
    }
}

// ============================================================================
// Geocoding
// ============================================================================

/// Single-line address sent to the geocoding service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeQuery {
    street: String,
    city: String,
    state: String,
}

impl GeocodeQuery {
    /// Build a query from a street address and the configured defaults
    pub fn new(street: &str, city: &str, state: &str) -> Self {
        Self {
            street: street.trim().to_string(),
            city: city.to_string(),
            state: state.to_string(),
        }
    }

    /// Build a query from a raw record
    pub fn from_record(record: &RawAddressRecord, city: &str, state: &str) -> Self {
        Self::new(&record.street_address, city, state)
    }

    /// Street part of the query
    pub fn street(&self) -> &str {
        &self.street
    }

    /// Full one-line address: `<street> <city> <state>`
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GeocodeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.street, self.city, self.state)
    }
}

/// A coordinate component kept in the textual form the geocoder returned.
///
/// The text is validated as a finite number but never re-formatted, so no
/// precision is lost between the service response and the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate(String);

impl Coordinate {
    /// Parse a coordinate from text
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_coordinate(text, "empty value"));
        }

        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Self(trimmed.to_string())),
            Ok(_) => Err(Error::invalid_coordinate(text, "not a finite number")),
            Err(e) => Err(Error::invalid_coordinate(text, e.to_string())),
        }
    }

    /// Read a coordinate from a JSON string or number
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => Self::parse(&n.to_string()),
            other => Err(Error::invalid_coordinate(
                other.to_string(),
                "expected a number or numeric string",
            )),
        }
    }

    /// Text exactly as it will be written
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Coordinate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Coordinate> for String {
    fn from(value: Coordinate) -> Self {
        value.0
    }
}

/// Outcome of one geocoding lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeResult {
    /// The service returned at least one match; this is the first
    Match {
        /// Longitude / X
        x: Coordinate,
        /// Latitude / Y
        y: Coordinate,
    },
    /// The service answered but had no candidates
    NoMatch,
}

impl GeocodeResult {
    /// Build a match result
    pub fn matched(x: Coordinate, y: Coordinate) -> Self {
        Self::Match { x, y }
    }
}

// ============================================================================
// Output
// ============================================================================

/// One line of the normalized output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeocodedRecord {
    /// Longitude / X
    pub x: Coordinate,
    /// Latitude / Y
    pub y: Coordinate,
    /// Category label
    #[serde(rename = "type")]
    pub kind: String,
}

impl GeocodedRecord {
    /// Create a residential record
    pub fn residential(x: Coordinate, y: Coordinate) -> Self {
        Self {
            x,
            y,
            kind: RESIDENTIAL.to_string(),
        }
    }

    /// Fields in output column order
    pub fn fields(&self) -> [&str; 3] {
        [self.x.as_str(), self.y.as_str(), self.kind.as_str()]
    }
}

/// Counts reported by one transform run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeSummary {
    /// Data rows read from the raw file
    pub input_rows: usize,
    /// Rows written to the output file
    pub matched: usize,
    /// Rows the service answered with zero candidates
    pub no_match: usize,
    /// Rows skipped because of a request, parse or input problem
    pub failed: usize,
}

impl GeocodeSummary {
    /// Rows not written to the output
    pub fn skipped(&self) -> usize {
        self.input_rows - self.matched
    }
}

impl fmt::Display for GeocodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} addresses geocoded, {} skipped ({} no match, {} failed)",
            self.matched,
            self.input_rows,
            self.skipped(),
            self.no_match,
            self.failed
        )
    }
}

// ============================================================================
// Log Level
// ============================================================================

/// Log level for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
