//! Address geocoding transform
//!
//! Reads the raw export, geocodes every row's street address in input order
//! and writes one `X,Y,Type` line per match. Row-level problems (unparsable
//! row, blank address, failed or unmatched lookup) are logged and skipped;
//! they never abort the run and never produce a placeholder line. Only
//! file-level problems are returned as errors.

mod reader;
mod writer;

pub use reader::AddressReader;
pub use writer::GeocodedCsvWriter;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::geocode::{build_geocoder, Geocoder};
use crate::types::{
    GeocodeQuery, GeocodeResult, GeocodeSummary, GeocodedRecord, STREET_ADDRESS_COLUMN,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Geocodes a raw address export into the normalized CSV
pub struct AddressGeocoder {
    geocoder: Box<dyn Geocoder>,
    city: String,
    state: String,
}

impl AddressGeocoder {
    /// Create a transform around a geocoder and the query defaults
    pub fn new(geocoder: Box<dyn Geocoder>, city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            geocoder,
            city: city.into(),
            state: state.into(),
        }
    }

    /// Create a transform from the pipeline config
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let geocoder = build_geocoder(&config.geocoder, &config.http)?;
        Ok(Self::new(geocoder, &config.city, &config.state))
    }

    /// Name of the active geocoder
    pub fn provider(&self) -> &str {
        self.geocoder.name()
    }

    /// Geocode `input` into `output`
    pub async fn transform(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<GeocodeSummary> {
        transform(
            input.as_ref(),
            output.as_ref(),
            &self.city,
            &self.state,
            self.geocoder.as_ref(),
        )
        .await
    }
}

impl std::fmt::Debug for AddressGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressGeocoder")
            .field("provider", &self.geocoder.name())
            .field("city", &self.city)
            .field("state", &self.state)
            .finish()
    }
}

/// Geocode every row of `input` and write matches to `output`.
///
/// The output file is truncated and rewritten on every call. Rows are
/// processed one at a time, strictly in input order.
pub async fn transform(
    input: &Path,
    output: &Path,
    city: &str,
    state: &str,
    geocoder: &dyn Geocoder,
) -> Result<GeocodeSummary> {
    info!(
        operation = "transform",
        provider = geocoder.name(),
        input = %input.display(),
        output = %output.display(),
        "Transforming addresses"
    );

    // Open the input first so a bad header leaves the previous output alone
    let reader = AddressReader::open(input, STREET_ADDRESS_COLUMN)?;
    let mut writer = GeocodedCsvWriter::create(output)?;
    let mut summary = GeocodeSummary::default();

    for item in reader {
        summary.input_rows += 1;

        let record = match item {
            Ok(record) => record,
            Err(Error::Csv(e)) if !e.is_io_error() => {
                warn!(row = summary.input_rows, error = %e, "Unreadable row; skipping");
                summary.failed += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        if record.is_blank() {
            warn!(row = record.row, "Blank street address; skipping");
            summary.failed += 1;
            continue;
        }

        let query = GeocodeQuery::from_record(&record, city, state);
        debug!(row = record.row, query = %query, "Geocoding address");

        match geocoder.geocode(&query).await {
            Ok(GeocodeResult::Match { x, y }) => {
                debug!(row = record.row, %x, %y, "Address matched");
                writer.write(&GeocodedRecord::residential(x, y))?;
                summary.matched += 1;
            }
            Ok(GeocodeResult::NoMatch) => {
                warn!(row = record.row, query = %query, "No matches found for address");
                summary.no_match += 1;
            }
            Err(e) => {
                warn!(row = record.row, query = %query, error = %e, "Geocoding failed; skipping row");
                summary.failed += 1;
            }
        }
    }

    let written = writer.finish()?;
    debug_assert_eq!(written, summary.matched);

    info!(
        input_rows = summary.input_rows,
        matched = summary.matched,
        skipped = summary.skipped(),
        "Transformation complete. Data written to {}",
        output.display()
    );
    Ok(summary)
}
