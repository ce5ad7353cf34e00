//! Normalized `X,Y,Type` CSV writer

use crate::error::Result;
use crate::types::{GeocodedRecord, OUTPUT_HEADER};
use csv::{Terminator, WriterBuilder};
use std::fs::File;
use std::path::Path;

/// Writes geocoded rows, truncating any previous output
pub struct GeocodedCsvWriter {
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl GeocodedCsvWriter {
    /// Create (or truncate) `path` and write the header line
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_path(path)?;
        writer.write_record(OUTPUT_HEADER)?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Append one record
    pub fn write(&mut self, record: &GeocodedRecord) -> Result<()> {
        self.writer.write_record(record.fields())?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush buffered rows to disk
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }
}
